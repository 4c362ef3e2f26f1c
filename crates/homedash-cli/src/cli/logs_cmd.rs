use super::*;

const FOLLOW_REFRESH: Duration = Duration::from_millis(250);

pub(in crate::cli) async fn handle_logs(session: &Session, args: LogsArgs) -> anyhow::Result<()> {
    let client = session.client()?;
    let tailer = LogTailer::new(Arc::new(client), session.config.tailer_config());
    let filter = args.kind.map(|kind| kind.to_lowercase());

    if !args.follow {
        tailer
            .poll_once()
            .await
            .map_err(|err| with_backend_hint(err, &session.config.base_url))?;
        print_entries(&tailer.buffer().entries(), filter.as_deref());
        return Ok(());
    }

    let handle = tailer.start();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut refresh = tokio::time::interval(FOLLOW_REFRESH);
    let mut printed = 0;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = refresh.tick() => {
                let fresh = tailer.buffer().since(printed);
                printed += fresh.len();
                print_entries(&fresh, filter.as_deref());
            }
        }
    }
    handle.stop();
    Ok(())
}

fn print_entries(entries: &[LogEntry], kind: Option<&str>) {
    for entry in entries.iter().filter(|entry| matches_kind(entry, kind)) {
        println!("{}", format_entry(entry));
    }
}

pub(in crate::cli) fn format_entry(entry: &LogEntry) -> String {
    if entry.kind.is_empty() {
        entry.content.clone()
    } else {
        format!("[{}] {}", entry.kind, entry.content)
    }
}

pub(in crate::cli) fn matches_kind(entry: &LogEntry, kind: Option<&str>) -> bool {
    kind.is_none_or(|kind| entry.kind == kind)
}
