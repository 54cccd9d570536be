use std::io::{self, Write};

use crate::view::Presenter;

use super::App;

pub fn render(app: &App, out: &mut impl Write) -> io::Result<()> {
    if Presenter::render_size_guard(out, app.cols, app.rows)? {
        return out.flush();
    }

    Presenter::render(out, &app.state, &app.theme, app.cols, app.rows)?;

    if let Some(ref pc) = app.pending_confirm {
        Presenter::render_confirmation(out, &pc.prompt, app.cols, app.rows)?;
    }

    out.flush()
}
