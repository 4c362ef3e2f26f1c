use super::*;

pub(in crate::cli) fn handle_integrations(session: &Session) -> anyhow::Result<()> {
    for def in IntegrationRegistry::new().definitions() {
        let connected = session.config.connected.contains(&def.kind);
        println!("{}", describe_integration(def, connected));
    }
    Ok(())
}

pub(in crate::cli) fn describe_integration(def: &IntegrationDefinition, connected: bool) -> String {
    let status = if connected { "connected" } else { "disconnected" };
    let mut lines = vec![
        format!("{} ({}) - {status}", def.name(), def.kind.as_slug()),
        format!("  fields: {}", def.required_fields.join(", ")),
    ];
    if !def.usage_lines.is_empty() {
        lines.push("  try:".to_string());
        lines.extend(def.usage_lines.iter().map(|line| format!("    {line}")));
    }
    lines.extend(def.reference_links.iter().map(|link| format!("  docs: {link}")));
    lines.extend(def.notes.iter().map(|note| format!("  note: {note}")));
    lines.join("\n")
}

pub(in crate::cli) fn check_mode(
    kind: IntegrationKind,
    mode: FormMode,
    connected: bool,
) -> anyhow::Result<()> {
    match (mode, connected) {
        (FormMode::Connect, true) => bail!(
            "{kind} is already connected; use `homedash edit {}` to change its credentials",
            kind.as_slug()
        ),
        (FormMode::Edit, false) => bail!(
            "{kind} is not connected; use `homedash connect {}` first",
            kind.as_slug()
        ),
        _ => Ok(()),
    }
}

pub(in crate::cli) async fn handle_submit(
    session: &mut Session,
    args: FieldArgs,
    mode: FormMode,
) -> anyhow::Result<()> {
    let mut board = session.board(Arc::new(session.client()?));
    let controller = board
        .get_mut(args.service)
        .with_context(|| format!("{} is not registered", args.service))?;
    check_mode(args.service, mode, controller.is_connected())?;

    controller.open_form()?;
    for (field, value) in &args.fields {
        controller.update_field(field, value)?;
    }
    for note in controller.definition().notes {
        println!("Note: {note}");
    }
    if stdin_is_tty() {
        prompt_missing_fields(controller)?;
    }
    controller.submit().await?;

    session.persist_connected(board.connected_kinds())?;
    match mode {
        FormMode::Connect => println!("Connected to {}.", args.service),
        FormMode::Edit => println!("Updated {}.", args.service),
    }
    Ok(())
}

pub(in crate::cli) async fn handle_disconnect(
    session: &mut Session,
    args: DisconnectArgs,
) -> anyhow::Result<()> {
    let mut board = session.board(Arc::new(session.client()?));
    let controller = board
        .get_mut(args.service)
        .with_context(|| format!("{} is not registered", args.service))?;
    if !controller.is_connected() {
        bail!("{} is not connected", args.service);
    }

    let skip_prompt = args.yes;
    let mut prompt = |message: &str| skip_prompt || confirm_stdin(message).unwrap_or(false);
    if !controller.disconnect(&mut prompt).await? {
        println!("Disconnect cancelled.");
        return Ok(());
    }

    session.persist_connected(board.connected_kinds())?;
    println!("Disconnected from {}.", args.service);
    Ok(())
}
