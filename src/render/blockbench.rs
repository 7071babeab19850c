//! Headless rendering through the Blockbench desktop application.
//!
//! Blockbench ships as an AppImage. Electron needs a display, so the renderer
//! prefers running under `xvfb-run` and falls back through progressively
//! simpler invocations:
//!
//! 1. `xvfb-run` + extracted `AppRun`
//! 2. extracted `AppRun`
//! 3. `xvfb-run` + AppImage `--appimage-extract-and-run`
//! 4. AppImage `--appimage-extract-and-run`

use super::{run_with_timeout, validate_png, Renderer};
use crate::error::{PreviewError, Result};
use crate::export::Project;
use crate::report::Reporter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Blockbench release used when none is configured.
pub const DEFAULT_VERSION: &str = "4.11.0";

/// Directory name of the extracted AppImage.
pub const EXTRACTED_DIR: &str = "Blockbench_extracted";

/// Flags that keep Electron from hanging without a GPU or shared memory.
const ELECTRON_FLAGS: &[&str] = &[
    "--headless",
    "--no-sandbox",
    "--disable-gpu",
    "--disable-software-rasterizer",
    "--disable-dev-shm-usage",
    "--disable-features=VizDisplayCompositor",
];

const XVFB_ARGS: &[&str] = &["--auto-servernum", "--server-args=-screen 0 1280x720x24"];

/// Blockbench renderer configuration.
#[derive(Debug, Clone)]
pub struct BlockbenchConfig {
    /// Release version, e.g. "4.11.0".
    pub version: String,
    /// Directory holding the AppImage and its extraction.
    pub tool_dir: PathBuf,
    /// Directory for project files and render output.
    pub work_dir: PathBuf,
    /// Wall-clock limit for a single invocation.
    pub timeout: Duration,
    /// Download the AppImage if it is missing.
    pub download: bool,
    /// Try `xvfb-run` when it is on `PATH`.
    pub use_xvfb: bool,
}

impl Default for BlockbenchConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            tool_dir: PathBuf::from("."),
            work_dir: std::env::temp_dir().join("mc-model-preview").join("render"),
            timeout: Duration::from_secs(120),
            download: true,
            use_xvfb: true,
        }
    }
}

impl BlockbenchConfig {
    pub fn app_image_name(&self) -> String {
        format!("Blockbench_{}.AppImage", self.version)
    }

    pub fn app_image_path(&self) -> PathBuf {
        self.tool_dir.join(self.app_image_name())
    }

    pub fn extracted_dir(&self) -> PathBuf {
        self.tool_dir.join(EXTRACTED_DIR)
    }

    pub fn app_run_path(&self) -> PathBuf {
        self.extracted_dir().join("AppRun")
    }

    pub fn download_url(&self) -> String {
        format!(
            "https://github.com/JannisX11/blockbench/releases/download/v{}/{}",
            self.version,
            self.app_image_name()
        )
    }
}

/// One way of launching Blockbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    XvfbAppRun,
    AppRun,
    XvfbAppImage,
    AppImage,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::XvfbAppRun,
        Strategy::AppRun,
        Strategy::XvfbAppImage,
        Strategy::AppImage,
    ];

    fn uses_xvfb(&self) -> bool {
        matches!(self, Strategy::XvfbAppRun | Strategy::XvfbAppImage)
    }
}

/// Renders projects by invoking Blockbench.
#[derive(Debug)]
pub struct BlockbenchRenderer {
    config: BlockbenchConfig,
    xvfb: Option<PathBuf>,
}

impl BlockbenchRenderer {
    /// Create a renderer and its work directory.
    pub fn new(config: BlockbenchConfig) -> Result<Self> {
        fs::create_dir_all(&config.work_dir)?;
        let xvfb = if config.use_xvfb {
            find_in_path("xvfb-run")
        } else {
            None
        };
        Ok(Self { config, xvfb })
    }

    pub fn config(&self) -> &BlockbenchConfig {
        &self.config
    }

    /// Make sure an executable is available: download the AppImage if needed
    /// and extract it once.
    pub fn setup(&self, reporter: &dyn Reporter) -> Result<()> {
        reporter.info(&format!("Setting up Blockbench {}...", self.config.version));
        fs::create_dir_all(&self.config.tool_dir)?;

        let app_image = self.config.app_image_path();
        let app_run = self.config.app_run_path();

        if !app_image.is_file() && !app_run.is_file() {
            if !self.config.download {
                return Err(PreviewError::Config(format!(
                    "Blockbench not found at {} and downloading is disabled",
                    app_image.display()
                )));
            }
            download(&self.config.download_url(), &app_image, reporter)?;
        }

        if app_image.is_file() {
            make_executable(&app_image)?;
            if !self.config.extracted_dir().is_dir() {
                if let Err(e) = self.extract() {
                    reporter.warn(&format!("Could not extract {}: {}", app_image.display(), e));
                }
            }
        }

        if app_run.is_file() {
            make_executable(&app_run)?;
            reporter.info(&format!(
                "Using extracted Blockbench executable at {}",
                app_run.display()
            ));
        } else {
            reporter.info(&format!("Using AppImage at {}", app_image.display()));
        }
        Ok(())
    }

    fn extract(&self) -> Result<()> {
        let status = run_with_timeout(
            Command::new(self.config.app_image_path())
                .arg("--appimage-extract")
                .current_dir(&self.config.tool_dir),
            self.config.timeout,
        )?;
        if !status.success() {
            return Err(PreviewError::RenderFailed(format!(
                "--appimage-extract exited with {}",
                status
            )));
        }
        fs::rename(
            self.config.tool_dir.join("squashfs-root"),
            self.config.extracted_dir(),
        )?;
        Ok(())
    }

    /// Build the command for `strategy`, or `None` if a required binary is
    /// missing.
    pub fn command(&self, strategy: Strategy, project: &Path, output: &Path) -> Option<Command> {
        let app_run = self.config.app_run_path();
        let app_image = self.config.app_image_path();

        let (target, extract_and_run) = match strategy {
            Strategy::XvfbAppRun | Strategy::AppRun => (app_run, false),
            Strategy::XvfbAppImage | Strategy::AppImage => (app_image.clone(), true),
        };
        if !target.is_file() {
            return None;
        }

        let mut command = if strategy.uses_xvfb() {
            let mut command = Command::new(self.xvfb.as_ref()?);
            command.args(XVFB_ARGS).arg(&target);
            command
        } else {
            Command::new(&target)
        };

        if extract_and_run {
            command.arg("--appimage-extract-and-run");
        } else {
            let extracted = self.config.extracted_dir();
            command
                .current_dir(&extracted)
                .env("APPDIR", &extracted)
                .env("APPIMAGE", &app_image);
        }

        command
            .args(ELECTRON_FLAGS)
            .arg(format!("--project={}", project.display()))
            .arg(format!("--export={}", output.display()))
            .arg("--render");
        Some(command)
    }
}

impl Renderer for BlockbenchRenderer {
    fn prepare(&self, reporter: &dyn Reporter) -> Result<()> {
        self.setup(reporter)
    }

    fn render(&self, project: &Project, name: &str, reporter: &dyn Reporter) -> Result<Vec<u8>> {
        let project_path = self.config.work_dir.join(format!("{}.bbmodel", name));
        let output_path = self.config.work_dir.join(format!("{}.png", name));

        fs::write(&project_path, project.to_json()?)?;
        match fs::remove_file(&output_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        reporter.info(&format!(
            "About to render: {} -> {}",
            project_path.display(),
            output_path.display()
        ));

        let mut last_error = None;
        for strategy in Strategy::ALL {
            let Some(mut command) = self.command(strategy, &project_path, &output_path) else {
                reporter.debug(&format!("Skipping {:?}: executable not available", strategy));
                continue;
            };

            match attempt(&mut command, &output_path, self.config.timeout) {
                Ok(bytes) => {
                    reporter.info(&format!("Rendered {} with {:?}", name, strategy));
                    return Ok(bytes);
                }
                Err(e) => {
                    reporter.debug(&format!("{:?} failed for {}: {}", strategy, name, e));
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => PreviewError::RenderFailed(format!("{}: {}", name, e)),
            None => PreviewError::RenderFailed(format!(
                "{}: no Blockbench executable found in {}",
                name,
                self.config.tool_dir.display()
            )),
        })
    }
}

/// Run one invocation and read back a valid PNG.
fn attempt(command: &mut Command, output: &Path, timeout: Duration) -> Result<Vec<u8>> {
    let status = run_with_timeout(command, timeout)?;
    if !status.success() {
        return Err(PreviewError::RenderFailed(format!("exited with {}", status)));
    }
    let bytes = fs::read(output).map_err(|e| {
        PreviewError::RenderFailed(format!("no image at {}: {}", output.display(), e))
    })?;
    validate_png(&bytes)?;
    Ok(bytes)
}

fn download(url: &str, destination: &Path, reporter: &dyn Reporter) -> Result<()> {
    reporter.info(&format!("Downloading {}", url));
    let response = ureq::get(url)
        .set("User-Agent", "mc-model-preview")
        .call()?;

    let partial = destination.with_extension("part");
    let mut file = fs::File::create(&partial)?;
    if let Err(e) = io::copy(&mut response.into_reader(), &mut file) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    drop(file);
    fs::rename(&partial, destination)?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Locate an executable on `PATH`.
fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;

    fn config(dir: &Path) -> BlockbenchConfig {
        BlockbenchConfig {
            tool_dir: dir.join("tools"),
            work_dir: dir.join("work"),
            timeout: Duration::from_secs(10),
            download: false,
            use_xvfb: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_paths_follow_version() {
        let config = BlockbenchConfig {
            tool_dir: PathBuf::from("/opt/bb"),
            ..Default::default()
        };
        assert_eq!(
            config.app_image_path(),
            PathBuf::from("/opt/bb/Blockbench_4.11.0.AppImage")
        );
        assert_eq!(
            config.app_run_path(),
            PathBuf::from("/opt/bb/Blockbench_extracted/AppRun")
        );
        assert_eq!(
            config.download_url(),
            "https://github.com/JannisX11/blockbench/releases/download/v4.11.0/Blockbench_4.11.0.AppImage"
        );
    }

    #[test]
    fn test_commands_skip_missing_executables() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = BlockbenchRenderer::new(config(dir.path())).unwrap();
        let project = dir.path().join("a.bbmodel");
        let output = dir.path().join("a.png");

        for strategy in Strategy::ALL {
            assert!(renderer.command(strategy, &project, &output).is_none());
        }
    }

    #[test]
    fn test_app_image_command_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::create_dir_all(&config.tool_dir).unwrap();
        fs::write(config.app_image_path(), "").unwrap();
        let renderer = BlockbenchRenderer::new(config).unwrap();

        let project = PathBuf::from("/tmp/x.bbmodel");
        let output = PathBuf::from("/tmp/x.png");
        assert!(renderer.command(Strategy::AppRun, &project, &output).is_none());
        // no xvfb configured
        assert!(renderer.command(Strategy::XvfbAppImage, &project, &output).is_none());

        let command = renderer.command(Strategy::AppImage, &project, &output).unwrap();
        let args: Vec<_> = command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "--appimage-extract-and-run");
        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--project=/tmp/x.bbmodel".to_string()));
        assert!(args.contains(&"--export=/tmp/x.png".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--render"));
    }

    #[test]
    fn test_new_does_not_touch_the_tool_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = BlockbenchConfig {
            download: true,
            ..config(dir.path())
        };
        let renderer = BlockbenchRenderer::new(config).unwrap();

        // nothing is downloaded until the renderer is prepared
        assert!(!renderer.config().tool_dir.exists());
        assert!(!renderer.config().app_image_path().exists());
    }

    #[test]
    fn test_prepare_without_download_fails_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = BlockbenchRenderer::new(config(dir.path())).unwrap();
        let reporter = RecordingReporter::new();
        assert!(matches!(renderer.prepare(&reporter), Err(PreviewError::Config(_))));
        assert_eq!(reporter.infos(), vec!["Setting up Blockbench 4.11.0..."]);
    }

    #[cfg(unix)]
    #[test]
    fn test_extraction_failure_is_reported_as_warning() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::create_dir_all(&config.tool_dir).unwrap();
        fs::write(config.app_image_path(), "#!/bin/sh\nexit 3\n").unwrap();
        let renderer = BlockbenchRenderer::new(config).unwrap();
        let reporter = RecordingReporter::new();

        renderer.setup(&reporter).unwrap();

        let warnings = reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Could not extract "));
        assert!(reporter
            .infos()
            .iter()
            .any(|info| info.starts_with("Using AppImage at ")));
    }

    #[test]
    fn test_render_without_executable_fails() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = BlockbenchRenderer::new(config(dir.path())).unwrap();
        let project = Project::new("custom:thing");

        let result = renderer.render(&project, "custom_thing.head", &RecordingReporter::new());
        assert!(matches!(result, Err(PreviewError::RenderFailed(_))));
        // the project document is still written for inspection
        assert!(dir.path().join("work/custom_thing.head.bbmodel").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_render_with_fake_app_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        fs::create_dir_all(config.extracted_dir()).unwrap();

        let fixture = dir.path().join("fixture.png");
        image::RgbaImage::new(4, 4).save(&fixture).unwrap();
        let script = format!(
            "#!/bin/sh\nfor arg in \"$@\"; do case \"$arg\" in --export=*) cp '{}' \"${{arg#--export=}}\";; esac; done\n",
            fixture.display()
        );
        fs::write(config.app_run_path(), script).unwrap();
        make_executable(&config.app_run_path()).unwrap();

        let renderer = BlockbenchRenderer::new(config).unwrap();
        let project = Project::new("custom:thing");

        let reporter = RecordingReporter::new();
        let bytes = renderer.render(&project, "custom_thing.base", &reporter).unwrap();
        assert_eq!(validate_png(&bytes).unwrap(), (4, 4));
        assert!(reporter
            .infos()
            .contains(&"Rendered custom_thing.base with AppRun".to_string()));
    }
}
