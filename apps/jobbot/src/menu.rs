//! Interactive menu shown when no subcommand is given.
//!
//! Every prompt re-asks on invalid input. End of input at any prompt quits
//! without running anything.

use std::io::{self, BufRead, Write};

use crate::cli::{Command, RunArgs};
use crate::portals::{Freshness, PortalKind};

const FRESHNESS_CHOICES: [Freshness; 4] = [
    Freshness::PastHour,
    Freshness::PastDay,
    Freshness::PastWeek,
    Freshness::PastMonth,
];

/// Walks the user through the menu and returns the command to run, or `None`
/// when input ends.
pub fn prompt_command<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<Command>> {
    writeln!(out, "\nJOB APPLICATION BOT")?;
    writeln!(out, "  1. Search jobs (score and save, no applications)")?;
    writeln!(out, "  2. Apply to jobs")?;
    writeln!(out, "  3. View statistics")?;
    writeln!(out, "  4. Apply to a specific job URL")?;

    let Some(choice) = ask_until(input, out, "Choice [1-4]: ", |answer| match answer {
        "1" | "2" | "3" | "4" => Some(answer.to_string()),
        _ => None,
    })?
    else {
        return Ok(None);
    };

    match choice.as_str() {
        "3" => Ok(Some(Command::Stats)),
        "4" => prompt_url(input, out),
        "1" => Ok(prompt_run_args(input, out)?.map(Command::Search)),
        _ => Ok(prompt_run_args(input, out)?.map(|run| Command::Apply { run, count: None })),
    }
}

fn prompt_url<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Option<Command>> {
    let Some(url) = ask_until(input, out, "Job URL: ", |answer| {
        (answer.starts_with("http://") || answer.starts_with("https://"))
            .then(|| answer.to_string())
    })?
    else {
        return Ok(None);
    };
    let Some(dry_run) = ask_yes_no(input, out, "Dry run? [y/N]: ")? else {
        return Ok(None);
    };
    Ok(Some(Command::ApplyUrl { url, dry_run }))
}

fn prompt_run_args<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<RunArgs>> {
    writeln!(out, "\nPortals:")?;
    writeln!(out, "  1. LinkedIn")?;
    writeln!(out, "  2. Work at a Startup")?;
    writeln!(out, "  3. Both")?;
    let Some(portals) = ask_until(input, out, "Choice [1-3]: ", |answer| match answer {
        "1" => Some(vec![PortalKind::LinkedIn]),
        "2" => Some(vec![PortalKind::WorkAtAStartup]),
        "3" => Some(PortalKind::ALL.to_vec()),
        _ => None,
    })?
    else {
        return Ok(None);
    };

    let mut freshness = Freshness::default();
    if portals.contains(&PortalKind::LinkedIn) {
        writeln!(out, "\nLinkedIn job freshness:")?;
        for (i, option) in FRESHNESS_CHOICES.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, option.description())?;
        }
        let Some(chosen) = ask_until(input, out, "Choice [1-4, default 2]: ", |answer| {
            if answer.is_empty() {
                return Some(Freshness::default());
            }
            answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| FRESHNESS_CHOICES.get(i).copied())
        })?
        else {
            return Ok(None);
        };
        freshness = chosen;
    }

    let salary_prompt = "Only jobs with a salary range? [y/N]: ";
    let Some(require_salary) = ask_yes_no(input, out, salary_prompt)? else {
        return Ok(None);
    };
    let Some(dry_run) = ask_yes_no(input, out, "Dry run? [y/N]: ")? else {
        return Ok(None);
    };

    Ok(Some(RunArgs {
        portals,
        freshness,
        require_salary,
        dry_run,
    }))
}

fn ask_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
) -> io::Result<Option<bool>> {
    ask_until(input, out, prompt, |answer| match answer.to_lowercase().as_str() {
        "" | "n" | "no" => Some(false),
        "y" | "yes" => Some(true),
        _ => None,
    })
}

fn ask_until<R, W, T>(
    input: &mut R,
    out: &mut W,
    prompt: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> io::Result<Option<T>>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if let Some(value) = parse(line.trim()) {
            return Ok(Some(value));
        }
        writeln!(out, "Invalid choice, please try again.")?;
    }
}
