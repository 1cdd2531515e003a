use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use exam_core::model::OptionId;
use services::{
    Clock, ConfigError, ExamCommand, ExamConfig, ExamLoopService, ExamPhase, ExamSession,
    SessionError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::vm::{DetailsVm, GradingVm, OptionMark, QuestionVm, ResultsVm};
use ui::{ExamScreen, Notice, NoticeKind, map_exam_screen};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingDocument,
    UnknownArg(String),
    InvalidTimeout { raw: String },
    Config(ConfigError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingDocument => write!(f, "a .docx or .doc file is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTimeout { raw } => write!(f, "invalid --timeout value: {raw}"),
            ArgsError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<ConfigError> for ArgsError {
    fn from(err: ConfigError) -> Self {
        ArgsError::Config(err)
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- run   <exam.docx> [--base-url <url>] [--timeout <secs>]");
    eprintln!("  cargo run -p app -- parse <exam.docx> [--base-url <url>] [--timeout <secs>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --base-url http://127.0.0.1:5000");
    eprintln!("  --timeout 30");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_API_BASE_URL, EXAM_HTTP_TIMEOUT_SECS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Parse,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "run" => Some(Self::Run),
            "parse" => Some(Self::Parse),
            _ => None,
        }
    }
}

struct Args {
    document: PathBuf,
    config: ExamConfig,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut config = ExamConfig::from_env()?;
        let mut document = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--base-url" => {
                    let value = require_value(args, "--base-url")?;
                    config = config.with_base_url(&value)?;
                }
                "--timeout" => {
                    let value = require_value(args, "--timeout")?;
                    let secs: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTimeout { raw: value.clone() })?;
                    config = config.with_timeout(Duration::from_secs(secs));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ if document.is_none() => document = Some(PathBuf::from(arg)),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            document: document.ok_or(ArgsError::MissingDocument)?,
            config,
        })
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn prompt_line(label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn report(err: &SessionError) {
    if let Some(notice) = Notice::from_error(err) {
        match notice.kind {
            NoticeKind::Inline => println!("  ! {}", notice.message),
            NoticeKind::Dismissible => println!("\n[error] {}\n", notice.message),
        }
    }
}

fn render_question(vm: &QuestionVm) {
    println!();
    println!("{}  ({:.0}%)  {}", vm.counter_label, vm.progress_percent, vm.score_label);
    println!("[{}] {}", vm.kind_label, vm.prompt);
    for (number, option) in vm.options.iter().enumerate() {
        let mark = match option.mark {
            OptionMark::Correct => " ✓",
            OptionMark::Wrong => " ✗",
            OptionMark::Unmarked => "",
        };
        let selected = if option.selected { "*" } else { " " };
        println!("  {selected}{}) {}{mark}", number + 1, option.label);
    }
    if let Some(feedback) = &vm.feedback {
        println!("{}  {}", feedback.verdict_label, feedback.correct_answer_label);
        if let Some(explanation) = &feedback.explanation {
            println!("  {explanation}");
        }
    }
}

fn render_grading(vm: &GradingVm) {
    println!("\nSubmitting for grading... {}", vm.answered_label);
    if let Some(failure) = &vm.failure {
        println!("  {failure}");
    }
}

fn render_results(vm: &ResultsVm) {
    println!("\nScore {}", vm.score_label);
    println!("{}, {}, accuracy {}", vm.correct_label, vm.wrong_label, vm.accuracy_label);
    if let (Some(graded_at), Some(elapsed)) = (&vm.graded_at_str, &vm.elapsed_label) {
        println!("graded {graded_at} after {elapsed}");
    }
}

fn render_details(vm: &DetailsVm) {
    for row in &vm.rows {
        let verdict = if row.is_correct { "✓" } else { "✗" };
        println!("\n{} {verdict} {} ({})", row.number_label, row.prompt, row.score_label);
        println!("  your answer: {}", row.user_answer_label);
        println!("  correct answer: {}", row.correct_answer);
        if let Some(explanation) = &row.explanation {
            println!("  {explanation}");
        }
    }
}

/// Option numbers typed by the user, 1-based and de-duplicated.
fn parse_selection(line: &str, available: usize) -> Option<Vec<OptionId>> {
    let mut ids = Vec::new();
    for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }
        let number: usize = token.parse().ok()?;
        if number == 0 || number > available {
            return None;
        }
        let id = OptionId::new(number - 1);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    (!ids.is_empty()).then_some(ids)
}

async fn answer_question(
    service: &ExamLoopService,
    session: &mut ExamSession,
    vm: &QuestionVm,
) -> Result<bool, Box<dyn std::error::Error>> {
    if let Some(next_label) = vm.next_label {
        if prompt_line(&format!("Enter for {next_label}, q to quit: "))?
            .is_none_or(|line| line == "q")
        {
            return Ok(false);
        }
        if let Err(err) = service.dispatch(session, ExamCommand::Advance).await {
            report(&err);
        }
        return Ok(true);
    }

    let Some(line) = prompt_line("Answer (option numbers), q to quit: ")? else {
        return Ok(false);
    };
    if line == "q" {
        return Ok(false);
    }
    let Some(selection) = parse_selection(&line, vm.options.len()) else {
        report(&SessionError::NoSelection);
        return Ok(true);
    };
    for id in selection {
        service.dispatch(session, ExamCommand::Select(id)).await?;
    }
    if let Err(err) = service.dispatch(session, ExamCommand::Submit).await {
        report(&err);
    }
    Ok(true)
}

async fn run_exam(
    service: &ExamLoopService,
    session: &mut ExamSession,
) -> Result<(), Box<dyn std::error::Error>> {
    service.dispatch(session, ExamCommand::StartLoaded).await?;

    loop {
        match map_exam_screen(session) {
            ExamScreen::Upload(_) => return Ok(()),
            ExamScreen::Question(vm) => {
                render_question(&vm);
                if !answer_question(service, session, &vm).await? {
                    session.restart();
                    return Ok(());
                }
            }
            ExamScreen::Grading(vm) => {
                render_grading(&vm);
                if prompt_line("r to retry grading, q to quit: ")?
                    .is_none_or(|line| line == "q")
                {
                    session.restart();
                    return Ok(());
                }
                if let Err(err) = service.retry_grading(session).await {
                    report(&err);
                }
            }
            ExamScreen::Results(vm) => {
                render_results(&vm);
                match prompt_line("d for details, q to quit: ")?.as_deref() {
                    Some("d") => {
                        service.dispatch(session, ExamCommand::ShowDetails).await?;
                    }
                    _ => return Ok(()),
                }
            }
            ExamScreen::Details(vm) => {
                render_details(&vm);
                match prompt_line("b for results, q to quit: ")?.as_deref() {
                    Some("b") => {
                        service.dispatch(session, ExamCommand::BackToResults).await?;
                    }
                    _ => return Ok(()),
                }
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => match Command::from_arg(first) {
            Some(cmd) => {
                argv.remove(0);
                cmd
            }
            // A bare file argument runs the exam.
            None => Command::Run,
        },
    };

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();
    info!(base_url = parsed.config.base_url(), "using exam backend");

    let service = ExamLoopService::from_config(&parsed.config)?;
    let mut session = ExamSession::new(Clock::default());

    let file_name = parsed
        .document
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = std::fs::read(&parsed.document)?;
    let stats = match service.load_document(&mut session, &file_name, bytes).await {
        Ok(stats) => stats,
        Err(err) => {
            report(&err);
            std::process::exit(1);
        }
    };
    println!(
        "Loaded {file_name}: {} questions, {} points",
        stats.total_questions, stats.total_score
    );

    match cmd {
        Command::Parse => {
            if let Some(document) = session.document() {
                for question in &document.questions {
                    println!(
                        "{} [{}] {} (answer {}, {} points)",
                        question.id(),
                        question.kind().as_str(),
                        question.prompt(),
                        question.correct_answer(),
                        question.max_score()
                    );
                }
            }
            Ok(())
        }
        Command::Run => {
            run_exam(&service, &mut session).await?;
            if session.phase() == ExamPhase::Idle {
                println!("Exam closed.");
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|arg| (*arg).to_owned());
        Args::parse(&mut iter)
    }

    #[test]
    fn parses_document_and_overrides() {
        let args = parse(&["exam.docx", "--base-url", "http://exam.local", "--timeout", "5"])
            .unwrap();
        assert_eq!(args.document, PathBuf::from("exam.docx"));
        assert_eq!(args.config.base_url(), "http://exam.local");
        assert_eq!(args.config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_missing_document_and_bad_timeout() {
        assert!(matches!(parse(&[]), Err(ArgsError::MissingDocument)));
        assert!(matches!(
            parse(&["exam.docx", "--timeout", "soon"]),
            Err(ArgsError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            parse(&["exam.docx", "--base-url"]),
            Err(ArgsError::MissingValue { flag: "--base-url" })
        ));
    }

    #[test]
    fn rejects_malformed_base_url() {
        for raw in ["http://exa mple/::[bad", "exam.local"] {
            assert!(matches!(
                parse(&["exam.docx", "--base-url", raw]),
                Err(ArgsError::Config(ConfigError::InvalidBaseUrl { .. }))
            ));
        }
    }

    #[test]
    fn selection_is_one_based_and_deduplicated() {
        assert_eq!(
            parse_selection("3, 1 3", 3),
            Some(vec![OptionId::new(2), OptionId::new(0)])
        );
        assert_eq!(parse_selection("4", 3), None);
        assert_eq!(parse_selection("", 3), None);
        assert_eq!(parse_selection("a", 3), None);
    }
}
