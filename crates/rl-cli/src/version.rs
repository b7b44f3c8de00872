pub const LICENSE: &str = "MIT <https://opensource.org/licenses/MIT>";
pub const COPYRIGHT: &str = "Copyright 2019 David Zerulla and Stefan Lengfeld";

/// Text printed for `--version`.
pub fn banner() -> String {
    format!(
        "repoload (gerrit query tool) version {}\nLicense: {LICENSE}\n{COPYRIGHT}\n",
        env!("CARGO_PKG_VERSION")
    )
}
