/// Owned, boxed future returned by the cluster seams, which keeps [`RowSource`] and [`RowSink`]
/// object safe and mockable.
///
/// [`RowSource`]: crate::session::RowSource
/// [`RowSink`]: crate::session::RowSink
pub type BoxFuture<'a, T> = futures::future::BoxFuture<'a, T>;
