/// Owned, boxed future returned by [`TaskBroker`](crate::broker::TaskBroker) methods.
pub type BoxFuture<'a, T> = futures::future::BoxFuture<'a, T>;
