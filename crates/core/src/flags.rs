/// Flag that would point the nested build at the parent's descriptor file
const DESCRIPTOR_FLAG: &str = "--gruntfile";

/// Build the argument list for a nested task run.
///
/// The current invocation's `flags` are appended to `tasks` when `forward` is set.
/// The first argument mentioning `--gruntfile` is then dropped, wherever it sits,
/// since each sub-project must use its own descriptor.
pub fn forward_args(tasks: &[String], flags: &[String], forward: bool) -> Vec<String> {
    let mut args = tasks.to_vec();
    if forward {
        args.extend(flags.iter().cloned());
    }

    if let Some(index) = args.iter().position(|arg| arg.contains(DESCRIPTOR_FLAG)) {
        args.remove(index);
    }

    args
}
