use super::Tier;

/// One link of a resolution chain: a tier and the function that asks it.
pub struct Resolver<C, T> {
    pub tier: Tier,
    pub resolve: fn(&C) -> Option<T>,
}

impl<C, T> Resolver<C, T> {
    pub fn new(tier: Tier, resolve: fn(&C) -> Option<T>) -> Self {
        Self { tier, resolve }
    }
}

impl<C, T> Clone for Resolver<C, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, T> Copy for Resolver<C, T> {}

impl<C, T> std::fmt::Debug for Resolver<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").field("tier", &self.tier).finish()
    }
}

/// Asks each resolver in order and returns the first answer with its tier.
pub fn first_success<C, T>(input: &C, chain: &[Resolver<C, T>]) -> Option<(T, Tier)> {
    chain
        .iter()
        .find_map(|resolver| (resolver.resolve)(input).map(|value| (value, resolver.tier)))
}
