use crate::{Role, Side};

/// First to claim: player one, then player two, then observers.
///
/// `taken` is every role already held in the room. Callers serialize joins,
/// so arrival order breaks ties.
pub fn assign_role<I>(taken: I) -> Role
where
    I: IntoIterator<Item = Role>,
{
    let mut one_taken = false;
    let mut two_taken = false;
    for role in taken {
        match role {
            Role::Player(Side::One) => one_taken = true,
            Role::Player(Side::Two) => two_taken = true,
            Role::Observer => {}
        }
    }

    if !one_taken {
        Role::Player(Side::One)
    } else if !two_taken {
        Role::Player(Side::Two)
    } else {
        Role::Observer
    }
}
