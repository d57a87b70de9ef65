use std::fmt;

/// The steps of one package installation, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallStep {
    /// `go get -d <name>`
    Fetch,
    /// `git fetch -q --tags origin <version>`
    FetchRef,
    /// `git reset --hard <version>`
    Reset,
    /// `go install <name>`
    Install,
}

impl InstallStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::FetchRef => "fetch-ref",
            Self::Reset => "reset",
            Self::Install => "install",
        }
    }
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
