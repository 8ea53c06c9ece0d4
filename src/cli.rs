use std::{
    fmt::Display,
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    str::FromStr,
};

use argh::FromArgs;
use log::LevelFilter;
use serde::Serialize;

use crate::{
    animation::{AnimationClip, ClipLayout},
    model::{BlendshapeBatch, Config, InvalidConfigError, MorphTargetTable},
    puppets::{ClipPlayer, FacePuppet, PuppetError},
    receivers::{ReceiverError, TalkService},
};

const PROGRAM_NAME: &str = "facecap";

#[derive(Debug)]
pub enum CliError {
    ParseFailure(argh::EarlyExit),
    MissingCommand,
    UnknownLayout { input: String },
    Config(InvalidConfigError),
    Receiver(ReceiverError),
    Puppet(PuppetError),
    Io { path: String, error: std::io::Error },
    Output(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailure(e) => write!(f, "{}", e.output),
            Self::MissingCommand => write!(f, "No command given, see --help"),
            Self::UnknownLayout { input } => write!(f, "Unknown clip layout: {input}"),
            Self::Config(e) => write!(f, "{e}"),
            Self::Receiver(e) => write!(f, "{e}"),
            Self::Puppet(e) => write!(f, "{e}"),
            Self::Io { path, error } => write!(f, "Unable to use {path}: {error}"),
            Self::Output(e) => write!(f, "Unable to write output: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<InvalidConfigError> for CliError {
    fn from(value: InvalidConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ReceiverError> for CliError {
    fn from(value: ReceiverError) -> Self {
        Self::Receiver(value)
    }
}

impl From<PuppetError> for CliError {
    fn from(value: PuppetError) -> Self {
        Self::Puppet(value)
    }
}

/// facecap command line interface
#[derive(Debug, FromArgs)]
pub struct Args {
    /// enable verbose logging, overridden by "quiet" if passed
    #[argh(switch, short = 'v', long = "verbose")]
    verbose: bool,
    /// disable all logging, overrides verbose
    #[argh(switch, short = 'q', long = "quiet")]
    quiet: bool,
    /// path to a json config file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,
    #[argh(subcommand)]
    commands: Option<Commands>,
}

impl Args {
    /// Parse some `args`, not including the program name.
    pub fn parse(args: &[&str]) -> Result<Self, CliError> {
        Self::from_args(&[PROGRAM_NAME], args).map_err(CliError::ParseFailure)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Off
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Run the selected command.
    pub fn run(self) -> Result<(), CliError> {
        let command = self.commands.ok_or(CliError::MissingCommand)?;

        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        let table = config.morph_target_table()?;

        match command {
            Commands::Talk(c) => c.run(config, table),
            Commands::Timeline(c) => c.run(config, table),
            Commands::Table(_) => write_table(&table),
            Commands::Info(_) => write_json(None, &crate::metadata()),
        }
    }
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
pub enum Commands {
    Talk(TalkCommand),
    Timeline(TimelineCommand),
    Table(TableCommand),
    Info(InfoCommand),
}

/// Send text to the talk service and print the resulting clip
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "talk")]
pub struct TalkCommand {
    /// text to speak
    #[argh(positional)]
    text: String,
    /// how frames are laid out as keyframes
    #[argh(option)]
    layout: Option<ClipLayout>,
    /// write the clip here instead of stdout
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,
}

impl TalkCommand {
    fn run(self, mut config: Config, table: MorphTargetTable) -> Result<(), CliError> {
        if let Some(layout) = self.layout {
            config.playback.layout = layout;
        }

        let service = TalkService::create(&config.talk_service)?;
        let mut puppet = new_puppet(config, table);
        let clip = puppet.submit_text(&service, &self.text)?;

        write_json(self.output, clip)
    }
}

/// Build a clip from a saved talk service response
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "timeline")]
pub struct TimelineCommand {
    /// path to a json response containing "blendData"
    #[argh(positional)]
    batch: PathBuf,
    /// how frames are laid out as keyframes
    #[argh(option)]
    layout: Option<ClipLayout>,
    /// write the clip here instead of stdout
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,
}

impl TimelineCommand {
    fn run(self, mut config: Config, table: MorphTargetTable) -> Result<(), CliError> {
        if let Some(layout) = self.layout {
            config.playback.layout = layout;
        }

        let data = std::fs::read(&self.batch).map_err(|error| CliError::Io {
            path: self.batch.display().to_string(),
            error,
        })?;
        let batch = BlendshapeBatch::from_slice(&data).map_err(ReceiverError::Decode)?;

        let clip: AnimationClip = new_puppet(config, table).clip_from_batch(&batch);

        write_json(self.output, &clip)
    }
}

/// Print the morph target table in slot order
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "table")]
pub struct TableCommand {}

/// Print library metadata
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "info")]
pub struct InfoCommand {}

impl FromStr for ClipLayout {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flattened" | "flat" => Ok(Self::Flattened),
            "per-frame" | "per_frame" | "pf" => Ok(Self::PerFrame),
            _ => Err(CliError::UnknownLayout {
                input: s.to_string(),
            }),
        }
    }
}

fn new_puppet(config: Config, table: MorphTargetTable) -> FacePuppet<ClipPlayer> {
    let player = ClipPlayer::new(table.len(), config.playback.track_name.as_str());

    FacePuppet::new(table, config.playback, player)
}

fn write_table(table: &MorphTargetTable) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();

    for (idx, name) in table.iter() {
        writeln!(out, "{idx}\t{name}").map_err(|error| CliError::Io {
            path: "stdout".to_string(),
            error,
        })?;
    }

    Ok(())
}

fn write_json<T: Serialize + ?Sized>(output: Option<PathBuf>, value: &T) -> Result<(), CliError> {
    match output {
        Some(path) => {
            let file = File::create(&path).map_err(|error| CliError::Io {
                path: path.display().to_string(),
                error,
            })?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value).map_err(CliError::Output)?;
            writer.flush().map_err(|error| CliError::Io {
                path: path.display().to_string(),
                error,
            })
        }
        None => {
            let mut out = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, value).map_err(CliError::Output)?;
            writeln!(out).map_err(|error| CliError::Io {
                path: "stdout".to_string(),
                error,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let args = Args::parse(&["--verbose"]).unwrap();

        assert_eq!(args.verbose, true);
        assert_eq!(args.quiet, false);
        assert_eq!(args.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn empty() {
        let args = Args::from_args(&["facecap"], &[]).unwrap();

        assert_eq!(args.verbose, false);
        assert_eq!(args.quiet, false);
        assert!(args.config.is_none());
        assert!(args.commands.is_none());
        assert_eq!(args.log_level(), LevelFilter::Info);
    }

    #[test]
    fn no_command_quiet_verbose() {
        let args = Args::from_args(&["facecap"], &["--quiet", "--verbose"]).unwrap();

        assert_eq!(args.verbose, true);
        assert_eq!(args.quiet, true);
        assert_eq!(args.log_level(), LevelFilter::Off);
    }

    #[test]
    fn config_path() {
        let args = Args::from_args(&["facecap"], &["-c", "./facecap.json", "table"]).unwrap();

        assert_eq!(args.config, Some(PathBuf::from("./facecap.json")));
        assert!(matches!(args.commands, Some(Commands::Table(_))));
    }

    #[test]
    fn missing_command() {
        let args = Args::from_args(&["facecap"], &[]).unwrap();

        assert!(matches!(args.run(), Err(CliError::MissingCommand)));
    }

    #[test]
    fn help_is_early_exit() {
        assert!(matches!(
            Args::parse(&["--help"]),
            Err(CliError::ParseFailure(_))
        ));
    }

    mod layout {
        use super::*;

        #[test]
        fn names() {
            assert_eq!("flattened".parse::<ClipLayout>().unwrap(), ClipLayout::Flattened);
            assert_eq!("flat".parse::<ClipLayout>().unwrap(), ClipLayout::Flattened);
            assert_eq!("per-frame".parse::<ClipLayout>().unwrap(), ClipLayout::PerFrame);
            assert_eq!("per_frame".parse::<ClipLayout>().unwrap(), ClipLayout::PerFrame);
            assert_eq!("pf".parse::<ClipLayout>().unwrap(), ClipLayout::PerFrame);
        }

        #[test]
        fn ignore_case() {
            assert_eq!("FlAtTeNeD".parse::<ClipLayout>().unwrap(), ClipLayout::Flattened);
        }

        #[test]
        fn unknown() {
            assert!(matches!(
                "sideways".parse::<ClipLayout>(),
                Err(CliError::UnknownLayout { .. })
            ));
        }
    }

    mod talk {
        use super::*;

        #[test]
        fn text_only() {
            let args = Args::from_args(&["facecap"], &["talk", "hello there"]).unwrap();

            match args.commands.unwrap() {
                Commands::Talk(v) => {
                    assert_eq!(v.text, "hello there");
                    assert!(v.layout.is_none());
                    assert!(v.output.is_none());
                }
                _ => assert!(false),
            }
        }

        #[test]
        fn layout_and_output() {
            let args = Args::from_args(
                &["facecap"],
                &["talk", "hi", "--layout", "flat", "-o", "./clip.json"],
            )
            .unwrap();

            match args.commands.unwrap() {
                Commands::Talk(v) => {
                    assert_eq!(v.layout, Some(ClipLayout::Flattened));
                    assert_eq!(v.output, Some(PathBuf::from("./clip.json")));
                }
                _ => assert!(false),
            }
        }

        #[test]
        fn missing_text() {
            assert!(Args::from_args(&["facecap"], &["talk"]).is_err());
        }

        #[test]
        fn unhandled_layout() {
            assert!(Args::from_args(&["facecap"], &["talk", "hi", "--layout", "__invalid__"]).is_err());
        }
    }

    mod timeline {
        use super::*;

        fn temp_path(name: &str) -> PathBuf {
            std::env::temp_dir().join(format!("facecap-{}-{name}", std::process::id()))
        }

        #[test]
        fn batch_path() {
            let args = Args::from_args(&["facecap"], &["timeline", "./response.json"]).unwrap();

            match args.commands.unwrap() {
                Commands::Timeline(v) => {
                    assert_eq!(v.batch, PathBuf::from("./response.json"));
                    assert!(v.layout.is_none());
                }
                _ => assert!(false),
            }
        }

        #[test]
        fn writes_clip() {
            let batch = temp_path("batch.json");
            let output = temp_path("clip.json");
            std::fs::write(
                &batch,
                r#"{"blendData": [{"blendshapes": {"eyeBlinkLeft": 1.0}}]}"#,
            )
            .unwrap();

            let args = Args::parse(&[
                "timeline",
                batch.to_str().unwrap(),
                "--layout",
                "flattened",
                "--output",
                output.to_str().unwrap(),
            ])
            .unwrap();
            args.run().unwrap();

            let clip: AnimationClip =
                serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
            assert_eq!(clip.name, "audioclip");
            assert_eq!(clip.tracks[0].times, vec![0.0, 2.0]);
            assert_eq!(clip.tracks[0].values.len(), 52);
            assert_eq!(clip.tracks[0].values[13], 1.0);

            let _ = std::fs::remove_file(batch);
            let _ = std::fs::remove_file(output);
        }

        #[test]
        fn missing_batch_file() {
            let args = Args::parse(&["timeline", "./__missing__.json"]).unwrap();

            assert!(matches!(args.run(), Err(CliError::Io { .. })));
        }

        #[test]
        fn bad_table_config() {
            let config = temp_path("config.json");
            let table = temp_path("table.json");
            std::fs::write(&table, r#"{"eyeBlink_L": -1}"#).unwrap();
            std::fs::write(
                &config,
                serde_json::json!({ "morph_targets": table }).to_string(),
            )
            .unwrap();

            let args = Args::parse(&["-c", config.to_str().unwrap(), "table"]).unwrap();

            assert!(matches!(
                args.run(),
                Err(CliError::Config(InvalidConfigError::NegativeIndex { .. }))
            ));

            let _ = std::fs::remove_file(config);
            let _ = std::fs::remove_file(table);
        }
    }
}
