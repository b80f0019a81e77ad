use super::opcodes::dispatch;
use super::recorder::Recorder;
use crate::data::Command;

/// Walk one event-command list in order, dispatching each command with its
/// 1-based line number as context. Null entries are skipped. Nested data,
/// such as a route step, is left to the opcode's own handler.
pub fn walk_commands(rec: &mut Recorder, list: &[Option<Command>]) {
    for (index, command) in list.iter().enumerate() {
        let Some(command) = command else {
            continue;
        };
        rec.set_command(index as u32 + 1, command.code);
        dispatch(rec, command.code, &command.parameters);
    }
    rec.clear_command();
}
