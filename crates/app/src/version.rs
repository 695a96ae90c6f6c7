use std::fmt;

/// Build metadata recorded by `build.rs`
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub package_version: &'static str,
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    pub rust_version: &'static str,
    pub target: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("REPO_VERSION"),
        package_version: env!("CARGO_PKG_VERSION"),
        build_profile: env!("BUILD_PROFILE"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        rust_version: env!("RUST_VERSION"),
        target: env!("BUILD_TARGET"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hush {} ({})", self.package_version, self.version)?;
        writeln!(f, "profile: {}", self.build_profile)?;
        writeln!(f, "built: {}", self.build_timestamp)?;
        writeln!(f, "target: {}", self.target)?;
        write!(f, "rustc: {}", self.rust_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_display() {
        let info = build_info();
        let text = info.to_string();
        assert!(text.starts_with(&format!("hush {}", env!("CARGO_PKG_VERSION"))));
        assert!(text.contains(info.build_profile));
        assert_eq!(text.lines().count(), 5);
    }
}
