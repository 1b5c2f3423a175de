// Generated identifiers: record ids, the placeholder email for identities
// that arrive without one, and the opaque password placeholder for accounts
// that only ever authenticate through the external provider.

use rand::distributions::Alphanumeric;
use rand::Rng;

const HOSTNAME_ALPHABET: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Unique id for records created by the bridge.
pub fn generate_id() -> String {
    nanoid::nanoid!()
}

/// Placeholder address for accounts whose claims carry no email. The
/// random label keeps the generated addresses from colliding.
pub fn placeholder_email() -> String {
    format!("change_this_email@{}.com", nanoid::nanoid!(16, &HOSTNAME_ALPHABET))
}

/// Random opaque password. Never used to authenticate; it only satisfies
/// the host system's requirement that accounts have one.
pub fn opaque_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
