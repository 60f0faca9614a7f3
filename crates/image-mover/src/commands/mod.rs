pub mod move_note;
pub mod settings;
pub mod watch;

use colored::Colorize;
use image_mover_core::{FailureKind, MoveFailure, RenameReport};

pub fn print_report(report: &RenameReport) {
    println!("{} {} -> {}", "Moved note".bold(), report.old_path, report.document);
    for relocation in &report.moved {
        println!(
            "{} {} -> {}",
            "✓".green(),
            relocation.from.display(),
            relocation.to.display()
        );
    }
    if report.skipped > 0 {
        println!("{} {} image(s) already in place", "-".dimmed(), report.skipped);
    }
    for failure in &report.failures {
        print_failure(failure);
    }
}

pub fn print_failures(failures: &[MoveFailure]) {
    if failures.is_empty() {
        println!("{} no failed image moves", "✓".green());
        return;
    }
    println!("{} failed image move(s):", failures.len().to_string().red().bold());
    for failure in failures {
        print_failure(failure);
    }
}

fn print_failure(failure: &MoveFailure) {
    let label = match failure.kind {
        FailureKind::Unsupported => "unsupported",
        FailureKind::CreateDir => "no folder",
        FailureKind::Move => "not moved",
    };
    println!(
        "{} [{}] {} in {}: {}",
        "✗".red(),
        label.yellow(),
        failure.reference,
        failure.document,
        failure.error
    );
}
