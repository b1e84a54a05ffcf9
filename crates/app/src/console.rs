//! Terminal rendering and input for the module and feed commands.

use std::io::Write;

use quake_core::model::{LearningChecklist, ModuleSummary};
use quake_core::time::{format_clock, format_duration};
use services::{FeedSnapshot, LiveFeed, ModuleService, ModuleStep};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type Input = Lines<BufReader<Stdin>>;

/// `Ok(None)` means stdin closed; callers treat it as the learner leaving.
async fn prompt(input: &mut Input, text: &str) -> std::io::Result<Option<String>> {
    print!("{text}");
    std::io::stdout().flush()?;
    input.next_line().await
}

pub async fn run_module(
    module: &mut ModuleService,
    feed: &LiveFeed,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_feed(&feed.snapshot(), 3);

        if !run_learning(module, &mut input).await? || !run_quiz(module, &mut input).await? {
            return Ok(());
        }
        if let Some(summary) = module.summary() {
            print_summary(summary);
        }

        match prompt(&mut input, "Retake the module? [y/N] ").await? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                module.restart();
            }
            _ => return Ok(()),
        }
    }
}

async fn run_learning(
    module: &mut ModuleService,
    input: &mut Input,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut checklist = LearningChecklist::earthquake();
    println!();
    println!("== Earthquake Learning Module ==");
    if let Some(name) = module.session().learner_name() {
        println!("Welcome, {name}.");
    }

    for (number, section) in checklist.sections().iter().enumerate() {
        println!();
        println!(
            "[{}/{}] {}",
            number + 1,
            checklist.sections().len(),
            section.title
        );
        for point in section.points {
            println!("  - {point}");
        }
        if prompt(input, "Press Enter to mark this section as read ").await?.is_none() {
            return Ok(false);
        }
        checklist.acknowledge(section.id)?;
        module.complete_learning(checklist.all_acknowledged())?;
    }

    Ok(true)
}

async fn run_quiz(
    module: &mut ModuleService,
    input: &mut Input,
) -> Result<bool, Box<dyn std::error::Error>> {
    println!();
    println!("== Earthquake Safety Quiz ==");

    loop {
        let Some(question) = module.current_question().cloned() else {
            return Ok(true);
        };
        if let Some(progress) = module.quiz_progress() {
            println!();
            println!(
                "Question {} of {} | score {}/{} | {}",
                progress.question_number,
                progress.total,
                progress.correct_so_far,
                progress.answered,
                format_clock(module.elapsed_seconds())
            );
        }
        println!("{}", question.prompt());
        for (i, option) in question.options().iter().enumerate() {
            println!("  {}) {option}", i + 1);
        }

        loop {
            let Some(line) = prompt(input, "Your answer (1-4): ").await? else {
                return Ok(false);
            };
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=question.options().len()).contains(&n) => {
                    module.select_answer(n - 1)?;
                    break;
                }
                _ => println!("Please enter a number from 1 to {}.", question.options().len()),
            }
        }

        let feedback = module.submit_answer()?;
        if feedback.is_correct {
            println!("Correct! Well done!");
        } else {
            println!(
                "Not quite right. The answer is: {}",
                question.options()[feedback.correct_index]
            );
        }
        println!("{}", feedback.explanation);

        if prompt(input, "Press Enter to continue ").await?.is_none() {
            return Ok(false);
        }
        if let ModuleStep::Completed(_) = module.advance()? {
            return Ok(true);
        }
    }
}

fn print_summary(summary: &ModuleSummary) {
    println!();
    println!("== Congratulations! ==");
    match &summary.learner_name {
        Some(name) => println!("{name}, you've completed the Earthquake Safety Module."),
        None => println!("You've completed the Earthquake Safety Module."),
    }
    println!("  Completion time: {}", format_duration(summary.elapsed_seconds));
    println!(
        "  Quiz score:      {} ({}/{})",
        summary.final_score, summary.correct_count, summary.total_questions
    );
}

fn print_feed(snapshot: &FeedSnapshot, limit: usize) {
    println!();
    if snapshot.loading {
        println!("Live earthquake activity: loading...");
        return;
    }

    match snapshot.last_updated {
        Some(at) => println!("Live earthquake activity (updated {at})"),
        None => println!("Live earthquake activity (no data yet)"),
    }
    if snapshot.stale {
        println!("  Data may be stale: latest refresh failed.");
    }
    for event in snapshot.events.iter().take(limit) {
        println!(
            "  M{:.1} {:<8} {} | depth {:.1} km | {}",
            event.magnitude(),
            event.class().label(),
            event.location(),
            event.depth_km(),
            event.occurred_at()
        );
    }
    if snapshot.events.is_empty() && !snapshot.stale {
        println!("  No qualifying events reported.");
    }
}

/// Print every published snapshot until Ctrl-C, or the first resolved one with `once`.
pub async fn watch_feed(feed: &LiveFeed, once: bool) {
    let mut updates = feed.subscribe();

    // The first fetch may have resolved before we subscribed.
    let current = updates.borrow_and_update().clone();
    if !current.loading {
        print_feed(&current, usize::MAX);
        if once {
            return;
        }
    }

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    return;
                }
                let snapshot = updates.borrow_and_update().clone();
                print_feed(&snapshot, usize::MAX);
                if once && !snapshot.loading {
                    return;
                }
            }
            _ = tokio::signal::ctrl_c() => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use quake_core::model::LiveEvent;
    use quake_core::time::fixed_clock;
    use services::{FeedError, FeedQuery, FeedSource};

    struct Unreachable;

    #[async_trait]
    impl FeedSource for Unreachable {
        async fn fetch(&self, _query: &FeedQuery) -> Result<Vec<LiveEvent>, FeedError> {
            Err(FeedError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    fn feed() -> LiveFeed {
        let query = FeedQuery {
            min_magnitude: 2.5,
            max_events: 10,
            window: Duration::from_secs(24 * 60 * 60),
        };
        LiveFeed::new(Arc::new(Unreachable), query, fixed_clock())
    }

    #[tokio::test(start_paused = true)]
    async fn once_returns_when_first_fetch_already_resolved() {
        let feed = feed();
        feed.fetch_latest().await;
        assert!(!feed.snapshot().loading);

        let watched = tokio::time::timeout(Duration::from_secs(1), watch_feed(&feed, true)).await;
        assert!(watched.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn once_waits_for_a_pending_first_fetch() {
        let feed = feed();
        let pending = feed.fetch_latest();

        let (watched, _) = tokio::join!(
            tokio::time::timeout(Duration::from_secs(1), watch_feed(&feed, true)),
            pending
        );
        assert!(watched.is_ok());
    }
}
