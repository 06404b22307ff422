use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use sweep_core::scan::{RunEvent, ScanCoordinator};
use sweep_model::ScanSnapshot;

/// How a foreground scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanExit {
    /// Every requested type existed.
    Clean,
    /// Some requested types were skipped.
    Partial,
}

impl From<ScanExit> for ExitCode {
    fn from(exit: ScanExit) -> Self {
        match exit {
            ScanExit::Clean => ExitCode::SUCCESS,
            ScanExit::Partial => ExitCode::from(2),
        }
    }
}

/// Runs a whole scan inline and reports progress to `out`.
///
/// With no explicit types every public content type is scanned.
pub async fn run_scan_command<W: Write>(
    coordinator: &ScanCoordinator,
    requested: &[String],
    out: &mut W,
) -> Result<ScanExit> {
    let requested = if requested.is_empty() {
        coordinator
            .public_content_types()
            .await
            .context("failed to list content types")?
            .into_iter()
            .map(|info| info.name.into_inner())
            .collect()
    } else {
        requested.to_vec()
    };

    let mut write_error = None;
    let summary = coordinator
        .run_to_completion_with(requested.as_slice(), |event| {
            if write_error.is_none()
                && let Err(err) = report(out, event)
            {
                write_error = Some(err);
            }
        })
        .await?;
    if let Some(err) = write_error {
        return Err(err.into());
    }

    writeln!(
        out,
        "Scan completed! Processed {} items in {:.2} seconds.",
        summary.processed,
        summary.elapsed.as_secs_f64()
    )?;

    Ok(if summary.ignored_types.is_empty() {
        ScanExit::Clean
    } else {
        ScanExit::Partial
    })
}

fn report<W: Write>(out: &mut W, event: RunEvent<'_>) -> io::Result<()> {
    match event {
        RunEvent::Selected {
            per_type,
            ignored_types,
        } => {
            let selected: Vec<&str> = per_type
                .iter()
                .map(|count| count.content_type.as_str())
                .collect();
            writeln!(out, "Starting maintenance scan for: {}", selected.join(", "))?;
            for ignored in ignored_types {
                writeln!(
                    out,
                    "Warning: Content type '{ignored}' does not exist. Skipping."
                )?;
            }
            for count in per_type {
                writeln!(
                    out,
                    "Scanning '{}': {} eligible items.",
                    count.content_type, count.eligible
                )?;
            }
        }
        RunEvent::Advanced(progress) if progress.is_processing() => {
            writeln!(out, "Processed {} items so far...", progress.processed)?;
        }
        RunEvent::Advanced(_) => {}
    }
    Ok(())
}

pub async fn run_status_command<W: Write>(
    coordinator: &ScanCoordinator,
    out: &mut W,
) -> Result<()> {
    let snapshot: ScanSnapshot = coordinator.status().await?;
    serde_json::to_writer_pretty(&mut *out, &snapshot)?;
    writeln!(out)?;
    Ok(())
}

pub async fn run_reset_command<W: Write>(
    coordinator: &ScanCoordinator,
    out: &mut W,
) -> Result<()> {
    coordinator.reset().await?;
    writeln!(out, "Scan state reset.")?;
    Ok(())
}
