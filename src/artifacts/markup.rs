/// HTML markup fetched from the dashboard's own static artifact endpoints.
///
/// These payloads are self-hosted outputs of the analysis pipeline, so they
/// are presented without escaping. The constructor is crate-private and
/// only called at the artifact fetch boundary (and for the fixed fallback
/// literals), so no other code path can mark an arbitrary string as
/// trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedMarkup(String);

impl TrustedMarkup {
    pub(crate) fn from_static_artifact(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
