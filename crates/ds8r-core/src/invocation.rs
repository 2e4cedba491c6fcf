use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::Ds8rError;
use crate::param::Parameter;

/// Overrides the location of the vendor executable.
pub const API_PATH_ENV: &str = "DS8R_API_PATH";

/// File stem of the vendor executable shipped next to the toolkit.
pub const API_FILE_STEM: &str = "DS8R_API";

static DEFAULT_API_PATH: OnceCell<PathBuf> = OnceCell::new();

/// Location of `DS8R_API`, resolved on first use and fixed for the rest of
/// the process: `$DS8R_API_PATH` if set, else next to the running binary.
pub fn default_api_path() -> Result<&'static Path, Ds8rError> {
    DEFAULT_API_PATH
        .get_or_try_init(resolve_api_path)
        .map(PathBuf::as_path)
}

fn resolve_api_path() -> Result<PathBuf, Ds8rError> {
    if let Some(path) = std::env::var_os(API_PATH_ENV) {
        debug!(env = API_PATH_ENV, "using vendor executable from environment");
        return Ok(PathBuf::from(path));
    }
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} has no parent directory", exe.display()),
        )
    })?;
    Ok(dir.join(format!("{API_FILE_STEM}{}", std::env::consts::EXE_SUFFIX)))
}

/// One call to the vendor executable: the program path plus the eight
/// setting codes in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    codes: [u32; 8],
}

impl Invocation {
    pub fn new(program: &Path, codes: [u32; 8]) -> Self {
        Self {
            program: program.to_path_buf(),
            codes,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn codes(&self) -> &[u32; 8] {
        &self.codes
    }

    pub fn code(&self, param: Parameter) -> u32 {
        self.codes[param.position()]
    }

    pub fn demand(&self) -> u32 {
        self.code(Parameter::Demand)
    }

    /// Arguments after the program, as decimal strings.
    pub fn args(&self) -> Vec<String> {
        self.codes.iter().map(u32::to_string).collect()
    }

    /// Program followed by the arguments, in the order they are passed.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.codes.len() + 1);
        tokens.push(self.program.display().to_string());
        tokens.extend(self.args());
        tokens
    }

    /// Human-readable command line. The program is double-quoted so paths
    /// with spaces read unambiguously; spawning never goes through a shell.
    pub fn command_line(&self) -> String {
        format!("\"{}\" {}", self.program.display(), self.args().join(" "))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}
