use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::SiteConfig;
use crate::content::SectionKey;
use crate::render::html_escape;
use crate::scroll::VisualReactor;

// ── Variants ──────────────────────────────────────────

/// Presentation flavour of the issue page. Every variant shares the same
/// content pipeline; only the decorative effects attached afterwards differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Minimal,
    Holographic,
}

impl Variant {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "minimal" => Some(Self::Minimal),
            "holographic" => Some(Self::Holographic),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Holographic => "holographic",
        }
    }

    pub fn effects(&self) -> &'static [Effect] {
        match self {
            Self::Minimal => &[],
            Self::Holographic => &[Effect::ParticleBackground, Effect::CardTilt, Effect::AudioReactive],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ParticleBackground,
    CardTilt,
    AudioReactive,
}

impl Effect {
    /// Markup placed before the page content.
    fn markup(&self) -> &'static str {
        match self {
            Self::ParticleBackground => r#"<div id="holographic-background" aria-hidden="true"></div>"#,
            Self::CardTilt => "",
            Self::AudioReactive => {
                r#"<button id="audio-toggle" class="audio-toggle" type="button">Enable audio</button>"#
            }
        }
    }

    /// External scripts the effect needs, loaded before the inline bootstrap.
    fn script_src(&self) -> Option<&'static str> {
        match self {
            Self::ParticleBackground => Some("https://cdnjs.cloudflare.com/ajax/libs/three.js/r128/three.min.js"),
            Self::CardTilt | Self::AudioReactive => None,
        }
    }

    fn inline_js(&self) -> &'static str {
        match self {
            Self::ParticleBackground => PARTICLE_JS,
            Self::CardTilt => TILT_JS,
            Self::AudioReactive => AUDIO_JS,
        }
    }
}

// ── Server-side reactor ───────────────────────────────

/// Resolves section keys to palette colours. The browser reactor receives
/// the same palette through the page's `data-palette` attribute.
#[derive(Debug, Clone)]
pub struct PaletteReactor {
    palette: BTreeMap<SectionKey, u32>,
    current: Option<u32>,
}

impl PaletteReactor {
    pub fn from_config(config: &SiteConfig) -> Self {
        PaletteReactor {
            palette: SectionKey::ALL
                .iter()
                .filter_map(|k| config.color_for(*k).map(|c| (*k, c)))
                .collect(),
            current: None,
        }
    }

    pub fn current(&self) -> Option<u32> {
        self.current
    }

    /// `{"cover":"#00f6ff",...}` for the client.
    pub fn palette_json(&self) -> String {
        let map: BTreeMap<&str, String> = self
            .palette
            .iter()
            .map(|(k, c)| (k.id(), format!("#{:06x}", c)))
            .collect();
        serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
    }
}

impl VisualReactor for PaletteReactor {
    /// Sections without a palette entry keep the previous colour.
    fn set_color(&mut self, key: SectionKey) {
        if let Some(color) = self.palette.get(&key) {
            self.current = Some(*color);
        }
    }
}

// ── Page assembly ─────────────────────────────────────

/// Markup for every effect of the variant, placed at the top of `<body>`.
pub fn build_effect_markup(variant: Variant) -> String {
    variant
        .effects()
        .iter()
        .map(|e| e.markup())
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join("\n    ")
}

/// Script tags: external libraries, then one inline bootstrap that builds
/// the reactor and hands it to the coordinator. Nothing is left on `window`.
pub fn build_scripts(variant: Variant, coordinator_js: &str) -> String {
    let effects = variant.effects();
    let mut html = String::new();

    for src in effects.iter().filter_map(|e| e.script_src()) {
        html.push_str(&format!("<script src=\"{}\"></script>\n", html_escape(src)));
    }

    let mut body = String::new();
    body.push_str(coordinator_js);
    body.push_str(NOOP_REACTOR_JS);
    for effect in effects {
        body.push_str(effect.inline_js());
    }

    let has_background = effects.contains(&Effect::ParticleBackground);
    let reactor_expr = if has_background {
        "createBackgroundReactor('holographic-background', palette)"
    } else {
        "createNoopReactor()"
    };

    let mut start = String::new();
    start.push_str("    var opts = document.body.dataset;\n");
    start.push_str("    var palette = {};\n");
    start.push_str("    try { palette = JSON.parse(opts.palette || '{}'); } catch (e) { palette = {}; }\n");
    start.push_str(&format!("    var reactor = {};\n", reactor_expr));
    if effects.contains(&Effect::CardTilt) {
        start.push_str("    attachTilt(document.querySelectorAll('.content-card'));\n");
    }
    if effects.contains(&Effect::AudioReactive) {
        start.push_str("    attachAudioToggle(document.getElementById('audio-toggle'), reactor);\n");
    }
    start.push_str("    startCoordinator(opts, reactor);\n");

    html.push_str(&format!(
        "<script>\n(function() {{\n{body}\ndocument.addEventListener('DOMContentLoaded', function() {{\n{start}}});\n}})();\n</script>",
        body = body,
        start = start,
    ));
    html
}

const NOOP_REACTOR_JS: &str = r#"
function createNoopReactor() {
    return { setColor: function() {}, attachAudio: function() {} };
}
"#;

const PARTICLE_JS: &str = r#"
function createBackgroundReactor(containerId, palette) {
    var container = document.getElementById(containerId);
    if (!container || typeof THREE === 'undefined') return createNoopReactor();

    var scene = new THREE.Scene();
    var camera = new THREE.PerspectiveCamera(75, window.innerWidth / window.innerHeight, 0.1, 1000);
    var renderer = new THREE.WebGLRenderer({ alpha: true });
    var mouse = new THREE.Vector2();
    var analyser = null, frequencyData = null;

    renderer.setSize(window.innerWidth, window.innerHeight);
    container.appendChild(renderer.domElement);
    camera.position.z = 5;

    var geometry = new THREE.BufferGeometry();
    var positions = [];
    for (var i = 0; i < 5000 * 3; i++) positions.push((Math.random() - 0.5) * 10);
    geometry.setAttribute('position', new THREE.Float32BufferAttribute(positions, 3));
    var original = geometry.attributes.position.clone();
    var material = new THREE.PointsMaterial({
        color: 0x00f6ff, size: 0.02, transparent: true,
        blending: THREE.AdditiveBlending, depthWrite: false
    });
    var points = new THREE.Points(geometry, material);
    scene.add(points);

    window.addEventListener('resize', function() {
        camera.aspect = window.innerWidth / window.innerHeight;
        camera.updateProjectionMatrix();
        renderer.setSize(window.innerWidth, window.innerHeight);
    });
    document.addEventListener('mousemove', function(e) {
        mouse.x = (e.clientX / window.innerWidth) * 2 - 1;
        mouse.y = -(e.clientY / window.innerHeight) * 2 + 1;
    });

    function applyAudio() {
        analyser.getByteFrequencyData(frequencyData);
        var pos = geometry.attributes.position.array, orig = original.array;
        var bass = frequencyData[0] / 255;
        var mid = frequencyData[Math.floor(frequencyData.length / 2)] / 255;
        for (var i = 0; i < pos.length; i++) {
            var level = frequencyData[i % frequencyData.length] / 255;
            pos[i] = orig[i] + orig[i] * level * (bass * 0.5 + mid * 0.2);
        }
        geometry.attributes.position.needsUpdate = true;
        material.size = 0.02 + bass * 0.03;
    }

    (function animate() {
        window.requestAnimationFrame(animate);
        points.rotation.y = Date.now() * 0.0001;
        if (analyser) applyAudio();
        camera.position.x += (mouse.x - camera.position.x) * 0.05;
        camera.position.y += (-mouse.y - camera.position.y) * 0.05;
        camera.lookAt(scene.position);
        renderer.render(scene, camera);
    })();

    return {
        setColor: function(key) {
            if (palette[key]) material.color.set(palette[key]);
        },
        attachAudio: function(node, ctx) {
            analyser = ctx.createAnalyser();
            analyser.fftSize = 256;
            node.connect(analyser);
            frequencyData = new Uint8Array(analyser.frequencyBinCount);
        }
    };
}
"#;

const TILT_JS: &str = r#"
function attachTilt(cards) {
    cards.forEach(function(card) {
        card.addEventListener('mousemove', function(e) {
            var r = card.getBoundingClientRect();
            var x = (e.clientX - r.left) / r.width - 0.5;
            var y = (e.clientY - r.top) / r.height - 0.5;
            card.style.setProperty('--tilt', 'rotateX(' + (-y * 10) + 'deg) rotateY(' + (x * 10) + 'deg)');
        });
        card.addEventListener('mouseleave', function() {
            card.style.removeProperty('--tilt');
        });
    });
}
"#;

const AUDIO_JS: &str = r#"
function attachAudioToggle(button, reactor) {
    if (!button) return;
    button.addEventListener('click', function() {
        if (!navigator.mediaDevices || !navigator.mediaDevices.getUserMedia) {
            alert('Audio input is not available in this browser.');
            return;
        }
        navigator.mediaDevices.getUserMedia({ audio: true })
            .then(function(stream) {
                var Ctx = window.AudioContext || window.webkitAudioContext;
                var ctx = new Ctx();
                reactor.attachAudio(ctx.createMediaStreamSource(stream), ctx);
                button.disabled = true;
                button.textContent = 'Audio on';
            })
            .catch(function(err) {
                console.error('Error initializing audio:', err);
                alert('Microphone access denied. Audio features will be disabled.');
            });
    });
}
"#;
