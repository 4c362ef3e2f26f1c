use super::*;

impl TuiApp {
    /// Returns `Ok(true)` when the dashboard should exit.
    pub(in crate::tui) fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(true);
        }
        match self.view {
            View::Board => Ok(self.handle_board_key(key)),
            View::Form(kind) => {
                self.handle_form_key(kind, key);
                Ok(false)
            }
            View::Confirm(kind) => {
                self.handle_confirm_key(kind, key);
                Ok(false)
            }
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> bool {
        let count = self.board.controllers().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                self.selected = (self.selected + 1) % count;
            }
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.selected = (self.selected + count - 1) % count;
            }
            KeyCode::Enter | KeyCode::Char('c') | KeyCode::Char('e') => {
                if let Some(kind) = self.selected_kind() {
                    self.open_form(kind);
                }
            }
            KeyCode::Char('d') => {
                if let Some(kind) = self.selected_kind() {
                    self.ask_disconnect(kind);
                }
            }
            _ => {}
        }
        false
    }

    fn open_form(&mut self, kind: IntegrationKind) {
        let Some(controller) = self.board.get_mut(kind) else {
            return;
        };
        match controller.open_form() {
            Ok(_) => {
                self.view = View::Form(kind);
                self.input_index = 0;
                self.status = None;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn ask_disconnect(&mut self, kind: IntegrationKind) {
        let Some(controller) = self.board.get(kind) else {
            return;
        };
        match controller.phase() {
            Phase::Connected => {
                self.view = View::Confirm(kind);
                self.status = None;
            }
            phase if phase.is_in_flight() => {
                self.status = Some(format!("{kind} is busy ({phase})."));
            }
            _ => self.status = Some(format!("{kind} is not connected.")),
        }
    }

    fn handle_form_key(&mut self, kind: IntegrationKind, key: KeyEvent) {
        let Some(controller) = self.board.get_mut(kind) else {
            self.view = View::Board;
            return;
        };
        if controller.phase().is_in_flight() {
            return;
        }
        let fields = controller.definition().required_fields;
        let count = fields.len().max(1);
        match key.code {
            KeyCode::Esc => match controller.cancel() {
                Ok(()) => self.view = View::Board,
                Err(err) => self.status = Some(err.to_string()),
            },
            KeyCode::Tab | KeyCode::Down => {
                self.input_index = (self.input_index + 1) % count;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.input_index = (self.input_index + count - 1) % count;
            }
            KeyCode::Enter => self.start_submit(kind),
            KeyCode::Backspace => {
                if let Some(field) = fields.get(self.input_index) {
                    let mut value = controller.form_value(field).to_string();
                    value.pop();
                    if let Err(err) = controller.update_field(field, &value) {
                        self.status = Some(err.to_string());
                    }
                }
            }
            KeyCode::Char(ch) => {
                if let Some(field) = fields.get(self.input_index) {
                    let mut value = controller.form_value(field).to_string();
                    value.push(ch);
                    if let Err(err) = controller.update_field(field, &value) {
                        self.status = Some(err.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, kind: IntegrationKind, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.view = View::Board;
                self.start_disconnect(kind);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.view = View::Board;
                self.status = Some("Disconnect cancelled.".to_string());
            }
            _ => {}
        }
    }
}
