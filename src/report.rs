//! Terminal rendering of outbound session messages.

use imgrab_engine::protocol::Outbound;
use tokio::sync::mpsc::UnboundedReceiver;

/// Prints each message as it arrives and keeps a tally for the final line.
#[derive(Debug, Default)]
pub struct Printer {
    discovered: usize,
    fetched: usize,
    bytes: u64,
    cancelled: bool,
    errors: Vec<String>,
}

impl Printer {
    pub async fn run(mut self, mut received: UnboundedReceiver<Outbound>) -> Self {
        while let Some(message) = received.recv().await {
            self.print(message);
        }
        self
    }

    fn print(&mut self, message: Outbound) {
        match message {
            Outbound::SelectionChanged { count } => tracing::info!(count, "Selection changed"),
            Outbound::ScanProgress {
                phase,
                progress,
                current,
                total,
            } => eprintln!("{phase}: {progress}% ({current}/{total})"),
            Outbound::ScanComplete { images } => {
                self.discovered = images.len();
                for image in &images {
                    println!("{}\t{}\t{}", image.hash, image.display_name, image.container_name);
                }
            },
            Outbound::DownloadStart {
                total_images, formats, ..
            } => eprintln!("Fetching {total_images} images (formats: {})", formats.join(", ")),
            Outbound::DownloadProgress {
                phase,
                progress,
                current,
                total,
                eta,
            } => eprintln!("{phase}: {progress}% ({current}/{total}, {eta})"),
            Outbound::ImagesBatchReady { images } => {
                for fetched in &images {
                    self.fetched += 1;
                    self.bytes += fetched.byte_size;
                    println!(
                        "{}{}\t{}\t{}\t{} bytes\t{}x{}",
                        fetched.image.display_name,
                        fetched.format.extension(),
                        fetched.format,
                        fetched.image.container_name,
                        fetched.byte_size,
                        fetched.width,
                        fetched.height
                    );
                }
            },
            Outbound::DownloadFinish => eprintln!("Fetched {} images ({} bytes)", self.fetched, self.bytes),
            Outbound::OperationCancelled => {
                self.cancelled = true;
                eprintln!("Cancelled");
            },
            Outbound::ErrorNotification { message } => {
                eprintln!("warning: {message}");
                self.errors.push(message);
            },
        }
    }

    /// Fail the process only if nothing useful came of the run.
    pub fn finish(self) -> miette::Result<()> {
        if self.cancelled {
            miette::bail!("cancelled after fetching {} of {} images", self.fetched, self.discovered);
        }
        match (self.discovered, self.errors.first()) {
            (0, Some(first)) => miette::bail!("{first}"),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_without_results_fails() {
        let mut printer = Printer::default();
        printer.print(Outbound::error("nothing is selected"));
        assert!(printer.finish().is_err());
    }

    #[test]
    fn test_empty_scan_succeeds() {
        let mut printer = Printer::default();
        printer.print(Outbound::ScanComplete { images: vec![] });
        assert!(printer.finish().is_ok());
    }

    #[test]
    fn test_cancelled_fails() {
        let mut printer = Printer::default();
        printer.print(Outbound::OperationCancelled);
        assert!(printer.finish().is_err());
    }
}
