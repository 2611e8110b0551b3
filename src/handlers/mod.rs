// Two security tiers: public (no auth, token acquisition) and
// protected (JWT bearer required, injected AuthUser).
pub mod protected;
pub mod public;
