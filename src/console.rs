//! JSON-lines console: commands in on stdin, widget views out on stdout.

use crate::system::CommandRouter;
use crate::view::WidgetView;
use log::{error, warn};
use std::io::{BufRead, Write};

/// Dispatches every command line until `input` is exhausted. Bad lines are
/// logged and skipped. Returns the number of commands routed.
pub fn read_commands<R: BufRead>(input: R, router: &CommandRouter) -> usize {
    let mut routed = 0;

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Console read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match router.dispatch_line(&line) {
            Ok(()) => routed += 1,
            Err(e) => warn!("Rejected console command: {}", e),
        }
    }

    routed
}

pub fn write_view<W: Write>(out: &mut W, view: &WidgetView) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, view)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirmation::ConfirmationPhase;
    use crate::system::WidgetCommand;
    use crate::types::{WidgetId, WidgetRecord};
    use std::io::Cursor;

    #[test]
    fn test_read_commands_skips_bad_lines() {
        let mut router = CommandRouter::new();
        let porch = router.register(WidgetId::from("porch"));
        let input = Cursor::new(
            "{\"type\":\"increase\",\"widget\":\"porch\"}\n\
             \n\
             not json\n\
             {\"type\":\"increase\",\"widget\":\"attic\"}\n\
             {\"type\":\"decrease\",\"widget\":\"porch\"}\n",
        );

        assert_eq!(read_commands(input, &router), 2);
        assert_eq!(porch.try_receive().ok(), Some(WidgetCommand::Increase));
        assert_eq!(porch.try_receive().ok(), Some(WidgetCommand::Decrease));
    }

    #[test]
    fn test_write_view_emits_one_json_line() {
        let view = WidgetView::new(
            WidgetId::from("porch"),
            WidgetRecord::default(),
            "24 hours".to_string(),
            ConfirmationPhase::Idle,
        );
        let mut out = Vec::new();
        write_view(&mut out, &view).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["id"], "porch");
        assert_eq!(value["remainingTimeLabel"], "24 hours");
        assert_eq!(value["powerConsumptionPercent"], 0.0);
        assert_eq!(value["modes"]["nightVision"], false);
        assert_eq!(value["segments"][0]["duskTillDawn"], false);
        assert_eq!(value["segments"].as_array().map(|s| s.len()), Some(5));
    }
}
