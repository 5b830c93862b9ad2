// handlers/mod.rs - Three access tiers
//
// Public (no identity) → Protected (X-User-Id) → Elevated (X-Admin-Key)
//
// The tier names where a handler lives, not a per-route guarantee: a few
// public routes accept an optional user, and protected routes still check
// ownership or site roles themselves.

pub mod elevated; // Tier 3: admin key checked by middleware (/admin, /moderator)
pub mod protected; // Tier 2: caller identity from X-User-Id
pub mod public; // Tier 1: catalog, reads, chapter upload
