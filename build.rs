use vergen_gitcl::{Emitter, GitclBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Branch, commit and dirty flag feed `plenario::version_string`.
    // Outside a git checkout nothing is emitted and the bare version is used.
    let git = GitclBuilder::default()
        .branch(true)
        .sha(true)
        .dirty(true)
        .build()?;
    let mut emitter = Emitter::default();
    // vergen-gitcl 1.x would otherwise emit VERGEN_IDEMPOTENT_OUTPUT placeholders.
    if emitter.fail_on_error().add_instructions(&git).is_ok() {
        emitter.emit()?;
    }
    Ok(())
}
