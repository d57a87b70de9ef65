//! Fixed names and defaults shared by the configuration layer

/// Default configuration file, relative to the user's home directory
pub const DEFAULT_CONFIG_FILE: &str = "~/.config/gotools.yml";

/// Default install root (`GOPATH`), relative to the user's home directory
pub const DEFAULT_GOPATH: &str = "~/go";

pub const DEFAULT_GO_BINARY: &str = "go";
pub const DEFAULT_GIT_BINARY: &str = "git";

pub const ENV_CWD: &str = "GOTOOLS_CWD";
pub const ENV_GOPATH: &str = "GOTOOLS_GOPATH";
pub const ENV_JOBS: &str = "GOTOOLS_JOBS";
