//! `qnr` - questionnaire data entry from the command line

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use qnr_analysis::Figure;
use qnr_core::{
    AppConfig, ConfigError, FormInput, QnrError, Session, SubmitTarget, DEFAULT_CONFIG_FILE,
    SETTABLE_KEYS,
};
use qnr_store::DEFAULT_RESPONSES_FILE;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn figure_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Output the figure as JSON for a renderer"),
    )
    .arg(
        Arg::new("out")
            .long("out")
            .value_parser(value_parser!(PathBuf))
            .help("Write to a file instead of stdout"),
    )
}

fn cli() -> Command {
    Command::new("qnr")
        .version(qnr_core::VERSION)
        .about("Questionnaire response entry, export and visualization")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .default_value(DEFAULT_CONFIG_FILE)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .default_value(DEFAULT_RESPONSES_FILE)
                .value_parser(value_parser!(PathBuf))
                .help("Response file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("More log output (-v info, -vv debug)"),
        )
        .subcommand(Command::new("list").about("List stored responses in file order"))
        .subcommand(
            Command::new("show")
                .about("Show one response as a filled-in form")
                .arg(
                    Arg::new("participant")
                        .long("participant")
                        .conflicts_with("index")
                        .help("Participant identifier"),
                )
                .arg(
                    Arg::new("index")
                        .long("index")
                        .value_parser(value_parser!(usize))
                        .help("Zero-based position in the store"),
                ),
        )
        .subcommand(
            Command::new("record")
                .about("Validate and save a response")
                .arg(
                    Arg::new("participant")
                        .long("participant")
                        .required(true)
                        .help("Participant identifier, e.g. a1"),
                )
                .arg(
                    Arg::new("rating")
                        .long("rating")
                        .action(ArgAction::Append)
                        .allow_hyphen_values(true)
                        .help("Rating answer, once per rating question in order"),
                )
                .arg(
                    Arg::new("open")
                        .long("open")
                        .action(ArgAction::Append)
                        .allow_hyphen_values(true)
                        .help("Open answer, once per open question in order"),
                )
                .arg(
                    Arg::new("new")
                        .long("new")
                        .action(ArgAction::SetTrue)
                        .help("Always append instead of updating the participant's response"),
                ),
        )
        .subcommand(
            Command::new("delete").about("Delete a response").arg(
                Arg::new("participant")
                    .long("participant")
                    .required(true)
                    .help("Participant identifier"),
            ),
        )
        .subcommand(
            Command::new("export")
                .about("Export responses (.csv for a table, anything else for text)")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Destination file"),
                ),
        )
        .subcommand(figure_args(
            Command::new("boxplot").about("Box plot of participant means per group"),
        ))
        .subcommand(figure_args(
            Command::new("heatmap").about("Heatmap of scores per question and participant"),
        ))
        .subcommand(figure_args(
            Command::new("plot")
                .about("Run a registered plot script (lists scripts without a name)")
                .arg(Arg::new("name").help("Script name")),
        ))
        .subcommand(
            Command::new("config")
                .about("Manage the configuration file")
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("init").about("Write a starter configuration").arg(
                        Arg::new("force")
                            .long("force")
                            .action(ArgAction::SetTrue)
                            .help("Overwrite an existing file"),
                    ),
                )
                .subcommand(Command::new("schema").about("Print the configuration JSON Schema"))
                .subcommand(Command::new("show").about("Print the effective configuration"))
                .subcommand(
                    Command::new("set")
                        .about("Change one setting")
                        .arg(
                            Arg::new("key")
                                .required(true)
                                .value_parser(SETTABLE_KEYS)
                                .help("Setting name"),
                        )
                        .arg(
                            Arg::new("value")
                                .required(true)
                                .allow_hyphen_values(true)
                                .help("New value"),
                        ),
                )
                .subcommand(
                    Command::new("add-question")
                        .about("Append a rating question")
                        .arg(
                            Arg::new("negative")
                                .long("negative")
                                .action(ArgAction::SetTrue)
                                .help("Negatively phrased; scores are reversed in figures"),
                        )
                        .arg(Arg::new("statement").required(true).help("Question text")),
                )
                .subcommand(Command::new("remove-question").about("Remove the last rating question"))
                .subcommand(
                    Command::new("add-open")
                        .about("Append an open question")
                        .arg(Arg::new("question").required(true).help("Question text")),
                )
                .subcommand(Command::new("remove-open").about("Remove the last open question")),
        )
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let correctable = err
                .downcast_ref::<QnrError>()
                .is_some_and(QnrError::is_user_correctable);
            ExitCode::from(if correctable { 2 } else { 1 })
        }
    }
}

fn path_arg<'a>(matches: &'a ArgMatches, id: &str) -> anyhow::Result<&'a Path> {
    matches
        .get_one::<PathBuf>(id)
        .map(PathBuf::as_path)
        .with_context(|| format!("missing --{id}"))
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config_path = path_arg(matches, "config")?;

    if let Some(("config", args)) = matches.subcommand() {
        return run_config(args, config_path);
    }

    let config = AppConfig::load(config_path).map_err(QnrError::from)?;
    let mut session = Session::open(config, path_arg(matches, "store")?)?;
    if let Some(err) = session.store().load_error() {
        eprintln!("warning: {err}; starting with an empty response list");
    }

    match matches.subcommand() {
        Some(("list", _)) => list(&session),
        Some(("show", args)) => {
            if let Some(id) = args.get_one::<String>("participant") {
                session.select_participant(id)?;
            } else if let Some(index) = args.get_one::<usize>("index") {
                session.select(*index)?;
            }
            show(&session);
        }
        Some(("record", args)) => {
            let strings = |id: &str| -> Vec<String> {
                args.get_many::<String>(id)
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default()
            };
            let participant = args
                .get_one::<String>("participant")
                .context("missing --participant")?;
            let input = FormInput::new(participant.as_str(), strings("rating"), strings("open"));
            let target = if args.get_flag("new") {
                SubmitTarget::New
            } else {
                SubmitTarget::ByParticipant
            };
            let index = session.submit(&input, target)?;
            println!("Response saved for {} (position {})", input.participant.trim(), index);
        }
        Some(("delete", args)) => {
            let participant = args
                .get_one::<String>("participant")
                .context("missing --participant")?;
            session.delete_participant(participant)?;
            println!("Deleted response for {participant}");
        }
        Some(("export", args)) => {
            let path = path_arg(args, "path")?;
            let format = session.export(path)?;
            println!(
                "Exported {} responses to {} ({:?})",
                session.store().len(),
                path.display(),
                format
            );
        }
        Some(("boxplot", args)) => emit_figure(&session.box_plot()?, args)?,
        Some(("heatmap", args)) => emit_figure(&session.heatmap()?, args)?,
        Some(("plot", args)) => match args.get_one::<String>("name") {
            Some(name) => emit_figure(&session.run_plot(name)?, args)?,
            None => {
                for name in session.plots().names() {
                    let description = session
                        .plots()
                        .get(name)
                        .map(|script| script.description())
                        .unwrap_or_default();
                    println!("{name:<20} {description}");
                }
            }
        },
        _ => bail!("no command given; see --help"),
    }
    Ok(())
}

fn run_config(args: &ArgMatches, path: &Path) -> anyhow::Result<()> {
    match args.subcommand() {
        Some(("init", init)) => {
            if path.exists() && !init.get_flag("force") {
                bail!("{} already exists; pass --force to overwrite", path.display());
            }
            AppConfig::write_default(path).map_err(QnrError::from)?;
            println!("Wrote starter configuration to {}", path.display());
        }
        Some(("schema", _)) => {
            println!("{}", serde_json::to_string_pretty(&AppConfig::schema())?);
        }
        Some(("show", _)) => {
            let config = AppConfig::load(path).map_err(QnrError::from)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Some(("set", set)) => {
            let (key, value) = (required(set, "key")?, required(set, "value")?);
            edit_config(path, |config| {
                config.set(key, value)?;
                Ok(format!("Set {key}"))
            })?;
        }
        Some(("add-question", add)) => {
            let statement = required(add, "statement")?;
            let negative = add.get_flag("negative");
            edit_config(path, |config| {
                let count = config.add_rating_question(statement, negative)?;
                Ok(format!("Added rating question {count}"))
            })?;
        }
        Some(("remove-question", _)) => edit_config(path, |config| {
            Ok(match config.remove_last_rating_question() {
                Some(question) => format!("Removed rating question '{}'", question.statement),
                None => "No rating questions to remove".to_string(),
            })
        })?,
        Some(("add-open", add)) => {
            let question = required(add, "question")?;
            edit_config(path, |config| {
                let count = config.add_open_question(question)?;
                Ok(format!("Added open question {count}"))
            })?;
        }
        Some(("remove-open", _)) => edit_config(path, |config| {
            Ok(match config.remove_last_open_question() {
                Some(question) => format!("Removed open question '{question}'"),
                None => "No open questions to remove".to_string(),
            })
        })?,
        _ => bail!("no config command given; see `qnr config --help`"),
    }
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> anyhow::Result<&'a str> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .with_context(|| format!("missing {id}"))
}

/// Load, apply `edit`, write back; nothing is written when `edit` fails
fn edit_config<F>(path: &Path, edit: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut AppConfig) -> Result<String, ConfigError>,
{
    let mut config = AppConfig::load(path).map_err(QnrError::from)?;
    let summary = edit(&mut config).map_err(QnrError::from)?;
    config.write(path).map_err(QnrError::from)?;
    println!("{summary} in {}", path.display());
    Ok(())
}

fn list(session: &Session) {
    println!("{}", session.config().app_settings.window_title);
    for (index, response) in session.store().responses().iter().enumerate() {
        let marker = if index == session.cursor() { '>' } else { ' ' };
        let participant = if response.is_draft() {
            "<draft>"
        } else {
            response.participant_number.as_str()
        };
        let ratings: Vec<String> = response.ratings.values().map(ToString::to_string).collect();
        println!("{marker} {index:>3}  {participant:<10} [{}]", ratings.join(", "));
    }
}

fn show(session: &Session) {
    let form = session.current_form();
    let questionnaire = session.questionnaire();
    let scale = questionnaire.scale;

    println!("Participant: {}", form.participant);
    for ((question, value), n) in questionnaire.ratings.iter().zip(&form.ratings).zip(1..) {
        let reversed = if question.is_negative { " (reversed)" } else { "" };
        println!(
            "  {n}. {}{reversed} [{}-{}]: {value}",
            question.statement, scale.start, scale.end
        );
    }
    for ((question, answer), n) in questionnaire.open.iter().zip(&form.open_answers).zip(1..) {
        println!("  Q{n}. {question}: {answer}");
    }
}

fn emit_figure(figure: &Figure, args: &ArgMatches) -> anyhow::Result<()> {
    let rendered = if args.get_flag("json") {
        serde_json::to_string_pretty(figure)?
    } else {
        figure.to_string()
    };

    match args.get_one::<PathBuf>("out") {
        Some(out) => {
            fs::write(out, rendered).with_context(|| format!("writing {}", out.display()))?;
            tracing::info!("Wrote {} to {}", figure.kind(), out.display());
            println!("Wrote {} to {}", figure.title(), out.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn record_collects_repeated_values() {
        let matches = cli()
            .try_get_matches_from([
                "qnr", "record", "--participant", "a1", "--rating", "4", "--rating", "2",
                "--open", "fine",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "record");
        let ratings: Vec<&String> = args.get_many::<String>("rating").unwrap().collect();
        assert_eq!(ratings, ["4", "2"]);
        assert_eq!(
            path_arg(&matches, "store").unwrap(),
            Path::new(DEFAULT_RESPONSES_FILE)
        );
    }

    fn config_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        AppConfig::write_default(&path).unwrap();
        path
    }

    fn run_args(args: &[&str]) -> anyhow::Result<()> {
        run(&cli().try_get_matches_from(args).unwrap())
    }

    #[test]
    fn config_set_writes_through() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = config_file(&dir);
        let config_arg = path.to_str().unwrap();

        run_args(&["qnr", "config", "set", "scale_end", "7", "--config", config_arg]).unwrap();
        run_args(&["qnr", "config", "set", "heatmap_colormap", "plasma", "--config", config_arg])
            .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.rating_settings.default_rating_range.end, 7);
        assert_eq!(config.heatmap_colormap(), "plasma");
    }

    #[test]
    fn config_set_rejects_bad_value_without_writing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = config_file(&dir);
        let before = fs::read_to_string(&path).unwrap();

        let err = run_args(&[
            "qnr", "config", "set", "scale_start", "9", "--config", path.to_str().unwrap(),
        ])
        .unwrap_err();
        assert!(err
            .downcast_ref::<QnrError>()
            .is_some_and(QnrError::is_user_correctable));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);

        assert!(cli()
            .try_get_matches_from(["qnr", "config", "set", "colour", "red"])
            .is_err());
    }

    #[test]
    fn config_question_edits_write_through() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = config_file(&dir);
        let config_arg = path.to_str().unwrap();

        run_args(&["qnr", "config", "add-question", "--negative", "Too loud", "--config", config_arg])
            .unwrap();
        run_args(&["qnr", "config", "add-open", "Anything else?", "--config", config_arg]).unwrap();
        let config = AppConfig::load(&path).unwrap();
        let statements: Vec<(&str, bool)> = config
            .rating_settings
            .questions
            .iter()
            .map(|q| (q.statement.as_str(), q.is_negative))
            .collect();
        assert_eq!(
            statements,
            vec![
                ("I quickly understood how to interact with the installation.", false),
                ("Too loud", true),
            ]
        );
        assert_eq!(config.open_questions_settings.questions, vec!["Anything else?"]);

        run_args(&["qnr", "config", "remove-question", "--config", config_arg]).unwrap();
        run_args(&["qnr", "config", "remove-open", "--config", config_arg]).unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.rating_settings.questions.len(), 1);
        assert!(config.open_questions_settings.questions.is_empty());
    }

    #[test]
    fn global_options_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["qnr", "list", "--config", "other.json", "-vv"])
            .unwrap();
        assert_eq!(path_arg(&matches, "config").unwrap(), Path::new("other.json"));
        assert_eq!(matches.get_count("verbose"), 2);
    }
}
