use std::fmt;

/// Newest document version this browser understands.
pub const SUPPORTED_VERSION: f32 = 3.3;

/// Browser profile reported when validating documents.
pub const BROWSER_PROFILE: Profile = Profile::Interactive;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Profile {
    Core,
    #[default]
    Interchange,
    Interactive,
    CadInterchange,
    Immersive,
    MpegInteractive,
    Medical,
    Full,
}

impl Profile {
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            Profile::Core | Profile::Interchange | Profile::Interactive
        )
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Profile::Core => "Core",
            Profile::Interchange => "Interchange",
            Profile::Interactive => "Interactive",
            Profile::CadInterchange => "CADInterchange",
            Profile::Immersive => "Immersive",
            Profile::MpegInteractive => "MPEG-4 interactive",
            Profile::Medical => "Medical",
            Profile::Full => "Full",
        };
        f.write_str(name)
    }
}

/// Version and profile declared by a scene document.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneHeader {
    pub version: Option<f32>,
    pub profile: Profile,
}

impl SceneHeader {
    /// Logs whether the document fits this browser. Loading continues either
    /// way; returns `false` when something is unsupported.
    pub fn validate(&self) -> bool {
        let mut supported = true;

        if let Some(version) = self.version.filter(|v| *v > SUPPORTED_VERSION) {
            tracing::warn!(
                "Document requires version {} but this browser supports X3D v{}",
                version,
                SUPPORTED_VERSION
            );
            supported = false;
        }

        if self.profile.is_supported() {
            tracing::info!("Browser supports {} profile", BROWSER_PROFILE);
        } else {
            tracing::warn!(
                "Document requires profile {} but this browser supports {}",
                self.profile,
                BROWSER_PROFILE
            );
            supported = false;
        }

        supported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_header_is_supported() {
        assert!(SceneHeader::default().validate());
    }

    #[test]
    fn newer_version_is_flagged() {
        let header = SceneHeader {
            version: Some(4.0),
            profile: Profile::Core,
        };
        assert!(!header.validate());
    }

    #[test]
    fn immersive_profile_is_flagged() {
        let header = SceneHeader {
            version: Some(3.3),
            profile: Profile::Immersive,
        };
        assert!(!header.validate());
    }
}
