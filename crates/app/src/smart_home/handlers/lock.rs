use super::{DirectiveContext, Outcome};
use crate::smart_home::capabilities::Interface;
use crate::smart_home::error::DirectiveError;
use crate::smart_home::properties::Property;

pub(super) fn handle(ctx: &DirectiveContext<'_>) -> Result<Outcome, DirectiveError> {
    let (service, lock_state) = match ctx.name() {
        "Lock" => ("lock", "LOCKED"),
        "Unlock" => ("unlock", "UNLOCKED"),
        _ => return Err(ctx.unsupported()),
    };
    Ok(Outcome::new(ctx.call("lock", service)).report(Property::new(
        Interface::LockController,
        "lockState",
        lock_state,
    )))
}
