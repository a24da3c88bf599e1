use std::env;
use std::io;
use std::process::ExitCode;

use promptpay_slip::csv::{OutcomeRow, read_transactions, write_outcomes};
use promptpay_slip::easyslip::RecordedVerifier;
use promptpay_slip::jsonl::read_uploads;
use promptpay_slip::notify::LogNotifier;
use promptpay_slip::store::{InMemoryStore, TransactionStore};
use promptpay_slip::{Config, SlipService};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let (Some(transactions_path), Some(uploads_path)) = (args.next(), args.next()) else {
        eprintln!("usage: promptpay-slip <transactions.csv> <uploads.jsonl>");
        return ExitCode::from(2);
    };

    if !transactions_path.ends_with(".csv") {
        warn!(path = %transactions_path, "transactions file seems to not be a csv file");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let store = InMemoryStore::new();
    let transactions = match read_transactions(&transactions_path) {
        Ok(transactions) => transactions,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    for result in transactions {
        match result {
            Ok(tx) => {
                if let Err(e) = store.insert(tx).await {
                    warn!("{e}");
                }
            }
            Err(e) => warn!("{e}"),
        }
    }

    let uploads = match read_uploads(uploads_path) {
        Ok(uploads) => uploads,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let service = SlipService::new(store, RecordedVerifier::new(), LogNotifier, config);
    let (upload_sender, upload_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in uploads {
            match result {
                Ok(upload) => {
                    if upload_sender.send(upload).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    let mut stream = ReceiverStream::new(upload_receiver);
    let mut outcomes = Vec::new();
    while let Some(upload) = stream.next().await {
        service
            .verifier()
            .record(upload.slip.as_bytes(), upload.response.to_string())
            .await;

        let result = service
            .verify_slip(upload.transaction_id, upload.slip.as_bytes())
            .await;
        if let Err(e) = &result {
            warn!(transaction = %upload.transaction_id, "{e}");
        }
        outcomes.push(OutcomeRow::new(upload.transaction_id, &result));
    }

    if let Err(e) = write_outcomes(io::stdout().lock(), outcomes) {
        error!("failed to write outcomes: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
