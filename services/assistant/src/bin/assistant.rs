//! services/assistant/src/bin/assistant.rs

use assistant_lib::{
    app::{gate, study::Explanation, AppState},
    config::Config,
    error::AppError,
};
use clap::{Parser, Subcommand};
use learning_assistant_core::domain::Role;
use learning_assistant_core::quiz::DEFAULT_QUESTIONS;
use learning_assistant_core::{Language, QuizError};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Offline-first learning assistant.
#[derive(Parser)]
#[command(name = "assistant", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with an email or a numeric user id.
    Login {
        identifier: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account (on the server, or on this device when it is unreachable).
    Register {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "student")]
        role: Role,
    },
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Explain a topic.
    Explain {
        topic: String,
        /// Read the explanation aloud.
        #[arg(long)]
        speak: bool,
        /// Keep the explanation in the notes.
        #[arg(long)]
        save: bool,
    },
    /// Ask a free-text question.
    Doubt {
        question: Vec<String>,
        /// Capture the question with the microphone.
        #[arg(long)]
        voice: bool,
        #[arg(long)]
        speak: bool,
        #[arg(long)]
        save: bool,
    },
    /// Take an interactive quiz.
    Quiz {
        topic: String,
        #[arg(long, default_value_t = DEFAULT_QUESTIONS)]
        count: usize,
    },
    /// Draft a lesson plan (teachers).
    LessonPlan {
        topic: String,
        #[arg(long)]
        save: bool,
    },
    /// Generate a ten-question test (teachers).
    GenerateTest { topic: String },
    /// Search a topic (teachers).
    Search { topic: String },
    /// List saved notes.
    Notes,
    /// Point the client at a different backend.
    SetApi { url: String },
    /// Show or change the language.
    Language { code: Option<Language> },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded.");

    // --- 2. Build the Shared AppState ---
    let state = AppState::from_config(config).await?;

    // --- 3. Run the Command ---
    run(&state, cli.command).await
}

async fn run(state: &AppState, command: Command) -> Result<(), AppError> {
    match command {
        Command::Login {
            identifier,
            password,
        } => {
            let _permit = state.gate.try_begin(gate::LOGIN)?;
            let outcome = state.auth.login(&identifier, &password).await?;
            println!(
                "Logged in as {} via {:?}. Opening the {} dashboard.",
                outcome.session.user_id,
                outcome.source,
                outcome.destination()
            );
        }
        Command::Register {
            email,
            password,
            role,
        } => {
            let _permit = state.gate.try_begin(gate::REGISTER)?;
            let outcome = state.auth.register(&email, &password, role).await?;
            println!(
                "Registered. Your user ID is {} ({:?}).",
                outcome.session.user_id, outcome.source
            );
        }
        Command::Logout => {
            state.auth.logout().await?;
            println!("Logged out.");
        }
        Command::Whoami => match state.auth.restore().await? {
            Some(session) => println!(
                "{} <{}> {} ({})",
                session.user_id,
                session.email.as_deref().unwrap_or("-"),
                session.role,
                if session.is_local() { "local" } else { "server" }
            ),
            None => println!("Not logged in."),
        },
        Command::Explain { topic, speak, save } => {
            let _permit = state.gate.try_begin(gate::EXPLAIN)?;
            let ctx = state.context().await?;
            let explanation = state.study.explain(&ctx, &topic).await?;
            present(state, &explanation, ctx.language, speak, save).await?;
        }
        Command::Doubt {
            question,
            voice,
            speak,
            save,
        } => {
            let _permit = state.gate.try_begin(gate::DOUBT)?;
            let ctx = state.context().await?;
            let question = if voice {
                println!("Listening...");
                state
                    .voice
                    .capture(ctx.language)
                    .await?
                    .ok_or_else(|| AppError::Validation("No speech captured".to_string()))?
            } else {
                question.join(" ")
            };
            let explanation = state.study.solve_doubt(&ctx, &question).await?;
            present(state, &explanation, ctx.language, speak, save).await?;
        }
        Command::Quiz { topic, count } => {
            let _permit = state.gate.try_begin(gate::QUIZ)?;
            run_quiz(state, &topic, count).await?;
        }
        Command::LessonPlan { topic, save } => {
            let _permit = state.gate.try_begin(gate::LESSON_PLAN)?;
            let ctx = state.context().await?;
            let plan = state.teacher.lesson_plan(&ctx, &topic).await?;
            present(state, &plan, ctx.language, false, save).await?;
        }
        Command::GenerateTest { topic } => {
            let _permit = state.gate.try_begin(gate::GENERATE_TEST)?;
            let ctx = state.context().await?;
            let test = state.teacher.generate_test(&ctx, &topic).await?;
            if test.offline {
                println!("(offline preview)");
            }
            println!("Test: {}", test.topic);
            for (i, question) in test.questions.iter().enumerate() {
                println!("\n{}. {}", i + 1, question.prompt);
                for (letter, option) in ['A', 'B', 'C', 'D'].iter().zip(&question.options) {
                    println!("   {}) {}", letter, option);
                }
                println!("   Answer: {}", ['A', 'B', 'C', 'D'][question.correct_answer_index]);
            }
        }
        Command::Search { topic } => {
            let _permit = state.gate.try_begin(gate::EXPLAIN)?;
            let ctx = state.context().await?;
            let explanation = state.teacher.search(&ctx, &topic).await?;
            present(state, &explanation, ctx.language, false, false).await?;
        }
        Command::Notes => {
            let notes = state.study.notes().await?;
            if notes.is_empty() {
                println!("No notes yet.");
            }
            for note in notes {
                println!(
                    "{}  {}  ({} sections)",
                    note.created_at.format("%Y-%m-%d %H:%M"),
                    note.title,
                    note.sections.len()
                );
            }
        }
        Command::SetApi { url } => {
            let clean = state.set_api_base(&url).await?;
            println!("API base set to {}", clean);
        }
        Command::Language { code: Some(language) } => {
            state.set_language(language).await?;
            println!("Language set to {}", language.label());
        }
        Command::Language { code: None } => {
            let current = state.language().await?;
            for language in Language::ALL {
                let marker = if language == current { "*" } else { " " };
                println!("{} {:<3} {}", marker, language.code(), language.label());
            }
        }
    }
    Ok(())
}

async fn present(
    state: &AppState,
    explanation: &Explanation,
    language: Language,
    speak: bool,
    save: bool,
) -> Result<(), AppError> {
    println!("{}", explanation.title);
    if explanation.offline {
        println!("(offline preview: the server could not be reached)");
    }
    for section in &explanation.sections {
        println!("\n## {}\n{}", section.heading, section.content);
    }
    if save {
        let note = state.study.save_note(explanation).await?;
        println!("\nSaved to notes ({}).", note.id);
    }
    if speak {
        if let Err(e) = state.voice.speak_sections(&explanation.sections, language).await {
            warn!("Could not read the explanation aloud: {}", e);
        }
    }
    Ok(())
}

async fn run_quiz(state: &AppState, topic: &str, count: usize) -> Result<(), AppError> {
    let ctx = state.context().await?;
    let mut quiz = state.quiz.lock().await;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let mut load = quiz.load(&ctx, topic, count).await?;
    loop {
        if load.offline {
            println!("(offline preview)");
        }
        let questions = quiz
            .attempt()
            .map(|attempt| attempt.questions().to_vec())
            .ok_or(QuizError::NotLoaded)?;

        for (i, question) in questions.iter().enumerate() {
            println!("\n{}. {}", i + 1, question.prompt);
            for (letter, option) in ['A', 'B', 'C', 'D'].iter().zip(&question.options) {
                println!("   {}) {}", letter, option);
            }
            loop {
                let Some(line) = prompt(&mut input, "Your answer (A-D): ").await? else {
                    println!("\nQuiz abandoned.");
                    return Ok(());
                };
                match parse_option(&line) {
                    Some(option) => {
                        quiz.select_answer(i, option)?;
                        break;
                    }
                    None => println!("Please answer with A, B, C or D."),
                }
            }
        }

        let score = quiz.submit()?;
        if let Some(attempt) = quiz.attempt() {
            println!("\nScore: {}/{} ({}%)", score, attempt.len(), attempt.percentage());
            for (i, answer) in attempt.selected().iter().enumerate() {
                let correct = attempt.correct_letter(i).unwrap_or('?');
                let given = answer.map(|a| (b'A' + a as u8) as char).unwrap_or('-');
                println!("  {}. you: {}  correct: {}", i + 1, given, correct);
            }
        }

        match prompt(&mut input, "\nRetry? [y/N] ").await? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                load = quiz.retry(&ctx).await?;
            }
            _ => return Ok(()),
        }
    }
}

async fn prompt(input: &mut Lines<BufReader<Stdin>>, text: &str) -> Result<Option<String>, AppError> {
    use std::io::Write;
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

fn parse_option(line: &str) -> Option<usize> {
    match line.trim().to_ascii_uppercase().as_str() {
        "A" | "1" => Some(0),
        "B" | "2" => Some(1),
        "C" | "3" => Some(2),
        "D" | "4" => Some(3),
        _ => None,
    }
}
