use super::*;

pub(in crate::cli) fn stdin_is_tty() -> bool {
    io::stdin().is_terminal()
}

pub(in crate::cli) fn confirm_stdin(message: &str) -> anyhow::Result<bool> {
    print!("{message} (y/n): ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(parse_yes(&input))
}

pub(in crate::cli) fn parse_yes(input: &str) -> bool {
    let choice = input.trim().to_lowercase();
    choice == "y" || choice == "yes"
}

/// Asks for every required field that has no value yet, in registry order.
pub(in crate::cli) fn prompt_missing_fields(
    controller: &mut IntegrationController,
) -> anyhow::Result<()> {
    for field in controller.definition().required_fields {
        if !controller.form_value(field).is_empty() {
            continue;
        }
        print!("{field}: ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        controller.update_field(field, input.trim())?;
    }
    Ok(())
}

pub(in crate::cli) fn with_backend_hint(err: anyhow::Error, base_url: &str) -> anyhow::Error {
    if is_network_error(&err) {
        return err.context(format!("is the assistant backend reachable at {base_url}?"));
    }
    err
}
