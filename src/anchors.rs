use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// Literal markers used by the five merge steps.
///
/// Every field has a built-in default matching the stock welcome page and
/// index layout; a TOML file may override any subset of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnchorSet {
    /// First line of the welcome stylesheet in the source document.
    pub style_start: String,
    /// End of the source `<style>` block.
    pub style_end: String,
    /// End of the target `<style>` block; styles go right before it.
    pub target_style_end: String,
    pub overlay_start: String,
    /// Boundary between the overlay markup and the source `<script>` block.
    pub overlay_end: String,
    /// Prefix of `overlay_end` kept at the tail of the overlay fragment.
    pub overlay_keep: String,
    pub body_open: String,
    /// Paragraph in the target home screen the greeting is anchored to.
    pub greeting_after: String,
    pub greeting_close: String,
    pub script_start: String,
    pub script_end: String,
    /// Last occurrence of this marker in the target receives the script.
    pub target_script_end: String,
    pub startup_hook: String,
    pub startup_open: String,
    /// Statement inserted on the first line of the startup hook body.
    pub entry_call: String,
}

impl Default for AnchorSet {
    fn default() -> Self {
        Self {
            style_start: "        /* Pantalla de bienvenida con partículas */".into(),
            style_end: "    </style>\n</head>".into(),
            target_style_end: "    </style>\n</head>".into(),
            overlay_start: "    <!-- Canvas para partículas -->".into(),
            overlay_end: "    </div>\n\n    <script>".into(),
            overlay_keep: "    </div>".into(),
            body_open: "<body>\n".into(),
            greeting_after: "<p>Bienvenido - Selecciona una opción</p>".into(),
            greeting_close: "</div>".into(),
            script_start: "        // Sistema de partículas animadas".into(),
            script_end: "    </script>\n</body>".into(),
            target_script_end: "    </script>\n</body>".into(),
            startup_hook: "window.onload = async function() {".into(),
            startup_open: "{".into(),
            entry_call: "            checkExistingSession();\n".into(),
        }
    }
}

impl AnchorSet {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let anchors: AnchorSet = toml::from_str(raw).context("invalid anchor file")?;
        anchors.validate()?;
        Ok(anchors)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read anchor file {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.fields() {
            if value.is_empty() {
                return Err(anyhow!("anchor `{name}` must not be empty"));
            }
        }
        if !self.overlay_end.starts_with(&self.overlay_keep) {
            return Err(anyhow!(
                "overlay_keep {:?} must be a prefix of overlay_end {:?}",
                self.overlay_keep,
                self.overlay_end
            ));
        }
        Ok(())
    }

    /// Bytes of `overlay_end` that stay in the overlay fragment.
    pub fn overlay_retain(&self) -> usize {
        if self.overlay_end.starts_with(&self.overlay_keep) {
            self.overlay_keep.len()
        } else {
            0
        }
    }

    fn fields(&self) -> [(&'static str, &str); 15] {
        [
            ("style_start", self.style_start.as_str()),
            ("style_end", self.style_end.as_str()),
            ("target_style_end", self.target_style_end.as_str()),
            ("overlay_start", self.overlay_start.as_str()),
            ("overlay_end", self.overlay_end.as_str()),
            ("overlay_keep", self.overlay_keep.as_str()),
            ("body_open", self.body_open.as_str()),
            ("greeting_after", self.greeting_after.as_str()),
            ("greeting_close", self.greeting_close.as_str()),
            ("script_start", self.script_start.as_str()),
            ("script_end", self.script_end.as_str()),
            ("target_script_end", self.target_script_end.as_str()),
            ("startup_hook", self.startup_hook.as_str()),
            ("startup_open", self.startup_open.as_str()),
            ("entry_call", self.entry_call.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let anchors = AnchorSet::default();
        anchors.validate().unwrap();
        assert_eq!(anchors.overlay_retain(), "    </div>".len());
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let anchors = AnchorSet::from_toml_str(
            r#"
            body_open = "<body class=\"app\">\n"
            greeting_after = "<p>Welcome</p>"
            "#,
        )
        .unwrap();
        assert_eq!(anchors.body_open, "<body class=\"app\">\n");
        assert_eq!(anchors.greeting_after, "<p>Welcome</p>");
        assert_eq!(anchors.style_end, AnchorSet::default().style_end);
        assert_eq!(anchors.entry_call, AnchorSet::default().entry_call);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AnchorSet::from_toml_str("body_tag = \"<body>\"").unwrap_err();
        assert!(format!("{err:#}").contains("body_tag"));
    }

    #[test]
    fn empty_anchor_is_rejected() {
        let err = AnchorSet::from_toml_str("script_end = \"\"").unwrap_err();
        assert!(err.to_string().contains("script_end"));
    }

    #[test]
    fn overlay_keep_must_prefix_overlay_end() {
        let err = AnchorSet::from_toml_str("overlay_keep = \"</section>\"").unwrap_err();
        assert!(err.to_string().contains("overlay_keep"));
    }
}
