use regrade::{ClosestMatchVerbose, ErrorCode, Grade, HintState, MarkKind, Question};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// What the CLI prints for one response.
pub struct Report<'a> {
    pub response: &'a str,
    pub question: &'a Question,
    pub run: &'a ClosestMatchVerbose,
    pub grade: &'a Grade,
    pub hint: &'a HintState,
    pub show_alternates: bool,
}

pub fn print_run(report: &Report<'_>, color: bool) {
    let palette = ansi::Palette::new(color);
    let result = &report.run.result;
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Matching: \"{}\"", report.response), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Closest answer ━━━", ansi::GRAY));
    if let Some(effective) = &report.run.details.effective_response {
        println!("  {} {}", palette.dim("with hint:"), palette.paint(effective, ansi::BLUE));
    }
    let mut answer = Vec::new();
    if !result.corrected_prefix.is_empty() {
        answer.push(palette.bold(palette.paint(&result.corrected_prefix, ansi::GREEN)));
    }
    if !result.highlighted_fix.is_empty() {
        answer.push(palette.bold(palette.paint(&result.highlighted_fix, ansi::YELLOW)));
    }
    if !result.remaining_suffix.is_empty() {
        answer.push(palette.dim(&result.remaining_suffix));
    }
    println!("  {}", answer.join(" "));
    println!(
        "  {} {}  {} {}  {} {}",
        palette.dim("rank:"),
        palette.paint(format!("{}.{}", result.rank, result.order), ansi::BLUE),
        palette.dim("│ fraction:"),
        palette.paint(result.fraction.to_string(), ansi::CYAN),
        palette.dim("│ distance:"),
        palette.paint(result.distance.to_string(), ansi::YELLOW),
    );
    println!(
        "  {} {}  {} {}",
        palette.dim("status:"),
        if result.is_complete() {
            palette.paint("✓ complete", ansi::GREEN)
        } else {
            palette.paint("… partial", ansi::YELLOW)
        },
        palette.dim("│ errors:"),
        error_label(result.error_code, &palette),
    );

    println!("\n{}", palette.paint("━━━ Words ━━━", ansi::GRAY));
    if result.marks.is_empty() {
        println!("{}", palette.dim("  No words in response"));
    } else {
        let words: Vec<String> = result
            .marks
            .iter()
            .map(|mark| match mark.kind {
                MarkKind::Correct => palette.paint(&mark.word, ansi::GREEN),
                MarkKind::Misplaced => palette.paint(&mark.word, ansi::YELLOW),
                MarkKind::Wrong => palette.paint(&mark.word, ansi::RED),
                MarkKind::Incomplete => palette.paint(&mark.word, ansi::CYAN),
            })
            .collect();
        println!("  {}", words.join(" "));
    }

    println!("\n{}", palette.paint("━━━ Grade ━━━", ansi::GRAY));
    match report.grade.answer {
        Some(answer) => println!(
            "  {} {}  {} {}",
            palette.dim("matched answer:"),
            palette.paint(answer.to_string(), ansi::BLUE),
            palette.dim("│ fraction:"),
            palette.bold(palette.paint(report.grade.fraction.to_string(), ansi::GREEN)),
        ),
        None => println!("  {}", palette.paint("no answer matched (0%)", ansi::RED)),
    }
    if let Some(feedback) = &report.grade.feedback {
        println!("  {} {}", palette.dim("feedback:"), feedback);
    }
    let penalty = report.question.penalty_for(report.hint);
    if penalty > 0.0 {
        println!("  {} {}", palette.dim("hint penalty:"), palette.paint(format!("-{penalty}"), ansi::YELLOW));
    }

    println!("\n{}", palette.paint("━━━ Candidates ━━━", ansi::GRAY));
    for (idx, candidate) in report.run.details.ranking.iter().take(5).enumerate() {
        println!(
            "  {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.bold(&candidate.text),
            palette.dim("│"),
            palette.paint(
                format!(
                    "d={} wrong={} misplaced={} missing={}",
                    candidate.distance, candidate.wrong, candidate.misplaced, candidate.missing
                ),
                ansi::YELLOW
            ),
        );
    }
    if report.run.details.ranking.len() > 5 {
        println!("  {}", palette.dim(format!("... +{} more", report.run.details.ranking.len() - 5)));
    }

    let catalog = report.question.catalog();
    if !catalog.warnings().is_empty() {
        println!("\n{}", palette.paint("━━━ Warnings ━━━", ansi::GRAY));
        for warning in catalog.warnings() {
            println!("  {}", palette.paint(warning.to_string(), ansi::YELLOW));
        }
    }

    if report.show_alternates {
        println!("\n{}", palette.paint("━━━ Alternate answers ━━━", ansi::GRAY));
        for line in catalog.to_string().lines() {
            println!("  {line}");
        }
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Scoring: {}  │  Hint: {}  │  Candidates: {}",
        palette.paint(format!("{:?}", report.run.details.total), ansi::GREEN),
        palette.paint(format!("{:?}", report.run.details.scoring), ansi::CYAN),
        palette.dim(format!("{:?}", report.run.details.rescoring)),
        palette.paint(report.run.details.candidates_scored.to_string(), ansi::BLUE),
    );
    println!();
}

fn error_label(code: ErrorCode, palette: &ansi::Palette) -> String {
    let label = match code {
        ErrorCode::None => return palette.paint("none", ansi::GREEN),
        ErrorCode::Misplaced => "misplaced words",
        ErrorCode::Wrong => "wrong words",
        ErrorCode::Both => "misplaced and wrong words",
    };
    palette.paint(format!("{label} ({})", code.legacy()), ansi::RED)
}
