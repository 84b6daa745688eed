use crate::capabilities::PageRasterizer;
use async_trait::async_trait;
use color_eyre::eyre::{Context, Result, bail};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

pub const DEFAULT_EXECUTABLE: &str = "gs";
pub const DEFAULT_DEVICE: &str = "png16m";

/// A builder for a single-page Ghostscript render.
pub struct GhostscriptCommand {
    executable: PathBuf,
    device: String,
    resolution: Option<u32>,
    page: u32,
    input: PathBuf,
    output: PathBuf,
}

impl GhostscriptCommand {
    pub fn new(input: &Path, output: &Path) -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            device: DEFAULT_DEVICE.to_string(),
            resolution: None,
            page: 1,
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        }
    }

    #[must_use]
    pub fn executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    #[must_use]
    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Render resolution in dpi. Left unset, Ghostscript uses its device default.
    #[must_use]
    pub const fn resolution(mut self, dpi: Option<u32>) -> Self {
        self.resolution = dpi;
        self
    }

    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-dBATCH".into(),
            "-dNOPAUSE".into(),
            "-dSAFER".into(),
            format!("-sDEVICE={}", self.device).into(),
            format!("-dFirstPage={}", self.page).into(),
            format!("-dLastPage={}", self.page).into(),
        ];
        if let Some(dpi) = self.resolution {
            args.push(format!("-r{dpi}").into());
        }
        let mut output_arg = OsString::from("-sOutputFile=");
        output_arg.push(self.output.as_os_str());
        args.push(output_arg);
        args.push(self.input.as_os_str().to_owned());
        args
    }

    /// Runs Ghostscript. With `fail_on_stderr`, any stderr output is a failure even when the
    /// exit status is zero.
    pub async fn run(self, fail_on_stderr: bool) -> Result<PathBuf> {
        let output = Command::new(&self.executable)
            .args(self.args())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("failed to run {}", self.executable.display()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();

        if !output.status.success() {
            bail!("ghostscript failed ({}): {}", output.status, stderr);
        }
        if !stderr.is_empty() {
            if fail_on_stderr {
                bail!("ghostscript reported errors: {stderr}");
            }
            warn!("ghostscript stderr (ignored): {stderr}");
        }
        if !tokio::fs::try_exists(&self.output).await.unwrap_or(false) {
            bail!("ghostscript produced no output at {}", self.output.display());
        }

        debug!("Rasterized {} to {}", self.input.display(), self.output.display());
        Ok(self.output)
    }
}

/// [`PageRasterizer`] backed by an out-of-process Ghostscript.
#[derive(Debug, Clone)]
pub struct GhostscriptRasterizer {
    pub executable: PathBuf,
    pub device: String,
    pub resolution: Option<u32>,
    pub fail_on_stderr: bool,
}

impl Default for GhostscriptRasterizer {
    fn default() -> Self {
        Self {
            executable: PathBuf::from(DEFAULT_EXECUTABLE),
            device: DEFAULT_DEVICE.to_string(),
            resolution: None,
            fail_on_stderr: true,
        }
    }
}

#[async_trait]
impl PageRasterizer for GhostscriptRasterizer {
    async fn rasterize_page(&self, input: &Path, output: &Path) -> Result<PathBuf> {
        GhostscriptCommand::new(input, output)
            .executable(&self.executable)
            .device(&self.device)
            .resolution(self.resolution)
            .run(self.fail_on_stderr)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    /// Writes an executable stand-in for Ghostscript. `$out` holds the `-sOutputFile` path.
    #[cfg(unix)]
    fn fake_ghostscript(dir: &TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.child("gs");
        let script = format!(
            "#!/bin/sh\nfor a in \"$@\"; do\n  case \"$a\" in -sOutputFile=*) out=\"${{a#-sOutputFile=}}\";; esac\ndone\n{body}\n"
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    async fn render_with(body: &str, fail_on_stderr: bool) -> (TempDir, Result<PathBuf>) {
        let dir = TempDir::new().unwrap();
        let executable = fake_ghostscript(&dir, body);
        let result = GhostscriptCommand::new(&dir.child("in.pdf"), &dir.child("out.png"))
            .executable(executable)
            .run(fail_on_stderr)
            .await;
        (dir, result)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn clean_run_returns_output_path() {
        let (dir, result) = render_with("printf page > \"$out\"", true).await;
        assert_eq!(result.unwrap(), dir.child("out.png"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let (_dir, result) = render_with("printf page > \"$out\"\nexit 3", false).await;
        let message = result.unwrap_err().to_string();
        assert!(message.contains("ghostscript failed"), "{message}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stderr_fails_a_strict_run() {
        let body = "printf page > \"$out\"\necho 'warning: font substituted' >&2";
        let (_dir, result) = render_with(body, true).await;
        let message = result.unwrap_err().to_string();
        assert!(message.contains("font substituted"), "{message}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stderr_is_tolerated_when_not_strict() {
        let body = "printf page > \"$out\"\necho 'warning: font substituted' >&2";
        let (dir, result) = render_with(body, false).await;
        assert_eq!(result.unwrap(), dir.child("out.png"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_output_is_an_error() {
        let (_dir, result) = render_with("exit 0", false).await;
        let message = result.unwrap_err().to_string();
        assert!(message.contains("produced no output"), "{message}");
    }

    #[test]
    fn renders_first_page_only() {
        let args =
            GhostscriptCommand::new(Path::new("/tmp/in.pdf"), Path::new("/tmp/out.png")).args();
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(
            args,
            [
                "-dBATCH",
                "-dNOPAUSE",
                "-dSAFER",
                "-sDEVICE=png16m",
                "-dFirstPage=1",
                "-dLastPage=1",
                "-sOutputFile=/tmp/out.png",
                "/tmp/in.pdf",
            ]
        );
    }

    #[test]
    fn resolution_and_device_are_passed() {
        let args = GhostscriptCommand::new(Path::new("in.pdf"), Path::new("out.png"))
            .device("pngalpha")
            .resolution(Some(150))
            .args();
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().to_string()).collect();
        assert!(args.contains(&"-sDEVICE=pngalpha".to_string()));
        assert!(args.contains(&"-r150".to_string()));
    }

    #[tokio::test]
    async fn missing_executable_is_an_error() {
        let rasterizer = GhostscriptRasterizer {
            executable: PathBuf::from("/nonexistent/ghostscript-binary"),
            ..GhostscriptRasterizer::default()
        };
        let result = rasterizer
            .rasterize_page(Path::new("in.pdf"), Path::new("out.png"))
            .await;
        assert!(result.is_err());
    }
}
