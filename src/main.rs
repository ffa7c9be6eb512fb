use clap::{
    Parser,
    Subcommand,
};
use kanji_drill::{
    api::KanjiApi,
    core::{
        kana::{
            to_field_kana,
            toggle_dakuten,
            toggle_handakuten,
        },
        resolve_level_id,
        AnswerField,
        JlptLevel,
        KanjiError,
        KanjiRecord,
    },
    navigation::{
        Direction,
        Scope,
    },
    persistence::DataStore,
    session::StudySession,
    settings::{
        Settings,
        SETTINGS_FILE,
    },
    sound::{
        FeedbackSounds,
        SoundCue,
    },
    validation::{
        AnswerInputs,
        SubmitOutcome,
        ValidAnswerSet,
    },
};
use tokio::io::{
    stdin,
    AsyncBufReadExt,
    BufReader,
    Lines,
    Stdin,
};

#[derive(Parser, Debug)]
#[command(name = "kanji-drill", version, about = "JLPT kanji flashcards in the terminal")]
struct Cli {
    /// Kanji API base URL, overrides the saved setting for this run
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the JLPT levels
    Levels,
    /// Show how a level is split into sublevels
    Sublevels { level: String },
    /// Show the readings and meanings of one kanji
    Lookup { kanji: String },
    /// Study a level interactively
    Study {
        level: String,

        /// Sublevel to study, 1-based
        #[arg(short, long)]
        page: Option<usize>,

        #[arg(long)]
        no_sound: bool,
    },
    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Set { key: String, value: String },
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StudyCommand {
    Move(Direction),
    Hint,
    Show,
    Help,
    Quit,
}

enum Entry {
    Answer(String),
    Command(StudyCommand),
    Closed,
}

const STUDY_HELP: &str = ":n next, :p previous, :r random, :h hint, :s show answer, :q quit. \
     In reading fields romaji is converted to kana; type \" after a kana to toggle its dakuten and * for handakuten.";

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), KanjiError> {
    let store = DataStore::app_default();
    let mut settings = Settings::load(&store);
    if let Some(api) = cli.api {
        settings.api_base_url = api;
    }

    match cli.command {
        Command::Levels => {
            for level in JlptLevel::ALL {
                println!("{}  {:<7} {}", level, level.api_id(), level.description());
            }
            Ok(())
        }
        Command::Sublevels { level } => show_sublevels(&settings, &level).await,
        Command::Lookup { kanji } => {
            let session = build_session(&settings)?;
            let record = session.fetch_details(kanji.trim()).await?;
            print_record(&record);
            Ok(())
        }
        Command::Study { level, page, no_sound } => {
            let mut sounds = FeedbackSounds::from_settings(&settings);
            if no_sound {
                sounds.set_enabled(false);
            }
            study(&settings, &level, page, &mut sounds).await
        }
        Command::Config { action } => configure(&store, action),
    }
}

fn build_session(settings: &Settings) -> Result<StudySession<KanjiApi>, KanjiError> {
    let api = KanjiApi::new(&settings.api_base_url, settings.timeout())?;
    Ok(StudySession::new(api).with_page_size(settings.page_size).with_policy(settings.policy()))
}

async fn show_sublevels(settings: &Settings, level: &str) -> Result<(), KanjiError> {
    let session = build_session(settings)?;
    let info = session.level_info(&resolve_level_id(level)).await?;

    println!("{}: {} kanji", info.index.level_id, info.index.total_items);
    if !info.index.uses_sublevels() {
        println!("Small enough to study as a whole.");
        return Ok(());
    }

    for sublevel in info.index.sublevels() {
        println!(
            "  {:>2}. kanji {:>4}-{:<4} ({:>3})  {}",
            sublevel.number,
            sublevel.first,
            sublevel.last,
            sublevel.count,
            sublevel.difficulty.label()
        );
    }
    Ok(())
}

fn configure(store: &DataStore, action: ConfigAction) -> Result<(), KanjiError> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load(store);
            println!("# {}", store.get_data_file_path(SETTINGS_FILE).display());
            for key in Settings::KEYS {
                println!("{} = {}", key, settings.get(key).unwrap_or_default());
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load(store);
            settings.set(&key, &value)?;
            settings.save(store)?;
            println!("{} = {}", key, settings.get(&key).unwrap_or_default());
        }
        ConfigAction::Reset => {
            Settings::reset(store)?;
            println!("Settings reset to defaults");
        }
    }
    Ok(())
}

async fn study(
    settings: &Settings,
    level: &str,
    page: Option<usize>,
    sounds: &mut FeedbackSounds,
) -> Result<(), KanjiError> {
    let session = build_session(settings)?;
    let level_id = resolve_level_id(level);
    log::info!(
        "Studying {} from {} ({} per sublevel, sound: {})",
        level_id,
        session.source().base_url(),
        session.page_size(),
        sounds.backend_name()
    );

    session.fetch_level(&level_id, page).await?;
    println!("{}", STUDY_HELP);
    print_card(&session);

    let mut lines = BufReader::new(stdin()).lines();

    'cards: loop {
        let Some(check) = session.answer_check() else {
            return Err(KanjiError::NoItemsLoaded);
        };

        let command = if check.is_revealed() {
            match read_entry(&mut lines, "move on (:n/:p/:r/:q)", None).await? {
                Entry::Closed => break 'cards,
                Entry::Command(command) => command,
                Entry::Answer(_) => {
                    println!("This card is done, pick the next one.");
                    continue;
                }
            }
        } else {
            let mut inputs = AnswerInputs::default();
            let mut command = None;
            for field in check.available_fields() {
                match read_entry(&mut lines, field.label(), Some(field)).await? {
                    Entry::Closed => break 'cards,
                    Entry::Command(c) => {
                        command = Some(c);
                        break;
                    }
                    Entry::Answer(answer) => {
                        sounds.play(SoundCue::KeyboardKey);
                        inputs.set(field, answer);
                    }
                }
            }

            match command {
                Some(command) => command,
                None => {
                    check_answers(&session, &inputs, sounds)?;
                    continue;
                }
            }
        };

        sounds.play(SoundCue::ButtonClick);
        match command {
            StudyCommand::Quit => break,
            StudyCommand::Help => println!("{}", STUDY_HELP),
            StudyCommand::Hint => match session.hint() {
                Some(hint) => println!("Hint: {}", hint),
                None => println!("No hint yet, keep trying."),
            },
            StudyCommand::Show => {
                if let Some(answers) = session.reveal() {
                    print_answers(&answers);
                }
            }
            StudyCommand::Move(direction) => match session.navigate(direction).await {
                Ok(_) => print_card(&session),
                Err(e @ (KanjiError::EndOfPage | KanjiError::StartOfPage)) => println!("{}", e),
                Err(e) => eprintln!("Error: {}", e),
            },
        }
    }

    Ok(())
}

fn check_answers(
    session: &StudySession<KanjiApi>,
    inputs: &AnswerInputs,
    sounds: &mut FeedbackSounds,
) -> Result<(), KanjiError> {
    match session.submit(inputs)? {
        SubmitOutcome::Incomplete { missing } => {
            let labels: Vec<&str> = missing.iter().map(|f| f.label()).collect();
            println!("Please fill in: {}", labels.join(", "));
        }
        SubmitOutcome::NoData => println!("No readings or meanings available for this kanji."),
        SubmitOutcome::Evaluated(outcome) => {
            if outcome.is_correct() {
                sounds.play(SoundCue::CorrectAnswer);
                println!("Correct! {} (attempt {})", outcome, outcome.attempt);
            } else {
                sounds.play(SoundCue::IncorrectAnswer);
                println!("Incorrect: {} (attempt {})", outcome, outcome.attempt);
            }
        }
    }

    let Some(check) = session.answer_check() else {
        return Ok(());
    };
    if let Some(answers) = check.revealed_answers() {
        print_answers(answers);
    } else if let Some(hint) = check.hint() {
        println!("Hint: {}", hint);
    }
    Ok(())
}

async fn read_entry(
    lines: &mut Lines<BufReader<Stdin>>,
    prompt: &str,
    field: Option<AnswerField>,
) -> Result<Entry, KanjiError> {
    loop {
        eprint!("{}> ", prompt);
        let Some(line) = lines.next_line().await? else {
            return Ok(Entry::Closed);
        };
        let line = line.trim();

        if let Some(command) = parse_command(line) {
            return Ok(Entry::Command(command));
        }
        if line.starts_with(':') {
            println!("Unknown command {}. {}", line, STUDY_HELP);
            continue;
        }

        return Ok(Entry::Answer(match field {
            Some(field @ (AnswerField::OnReading | AnswerField::KunReading)) => {
                apply_voicing_marks(&to_field_kana(field, line))
            }
            _ => line.to_string(),
        }));
    }
}

fn parse_command(line: &str) -> Option<StudyCommand> {
    let command = match line {
        ":n" | ":next" => StudyCommand::Move(Direction::Next),
        ":p" | ":prev" => StudyCommand::Move(Direction::Previous),
        ":r" | ":random" => StudyCommand::Move(Direction::Random),
        ":h" | ":hint" => StudyCommand::Hint,
        ":s" | ":show" => StudyCommand::Show,
        ":?" | ":help" => StudyCommand::Help,
        ":q" | ":quit" => StudyCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// `"` toggles the dakuten and `*` the handakuten of the kana before it.
fn apply_voicing_marks(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => output = toggle_dakuten(&output),
            '*' => output = toggle_handakuten(&output),
            _ => output.push(c),
        }
    }
    output
}

fn print_card(session: &StudySession<KanjiApi>) {
    let Some(record) = session.current_record() else {
        return;
    };

    let position = session.level().map(|level| {
        let scope = match level.cursor.scope() {
            Scope::Page(page) => format!("sublevel {}/{}", page, level.index.page_count),
            Scope::FullLevel => "full level".to_string(),
        };
        format!(
            "{} {}, {}/{}",
            level.index.level_id,
            scope,
            level.cursor.position() + 1,
            level.cursor.len()
        )
    });

    println!();
    println!("  {}    [{}]", record.character, position.unwrap_or_default());
    let missing: Vec<&str> =
        AnswerField::ALL.iter().filter(|f| !record.is_available(**f)).map(|f| f.label()).collect();
    if !missing.is_empty() {
        println!("  (no {} for this kanji)", missing.join(" or "));
    }
}

fn print_answers(answers: &[ValidAnswerSet]) {
    println!("Answers:");
    for answer in answers {
        println!("  {}: {}", answer.field(), answer.variants().join(", "));
    }
}

fn print_record(record: &KanjiRecord) {
    println!("{}", record.character);
    for field in AnswerField::ALL {
        let values = record.field(field);
        let shown = if values.is_empty() { "N/A".to_string() } else { values.join(", ") };
        println!("  {:<12} {}", field.label(), shown);
    }
    if let Some(strokes) = record.stroke_count {
        println!("  {:<12} {}", "strokes", strokes);
    }
    if let Some(grade) = record.grade {
        println!("  {:<12} {}", "grade", grade);
    }
    if let Some(jlpt) = record.jlpt {
        println!("  {:<12} N{}", "jlpt", jlpt);
    }
}
