//! Abstractions for offset pagination.

/// A page of nodes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<I> {
    /// Nodes on this [`Page`].
    pub nodes: Vec<I>,

    /// Number of nodes skipped before this [`Page`].
    pub offset: usize,

    /// Maximum number of nodes this [`Page`] was requested with.
    pub limit: usize,

    /// Indicator whether there are more nodes after this [`Page`].
    pub has_more: bool,
}

impl<I> Page<I> {
    /// Creates a new [`Page`] from the provided nodes.
    #[must_use]
    pub fn new(
        args: &Arguments,
        nodes: impl IntoIterator<Item = impl Into<I>>,
        has_more: bool,
    ) -> Self {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            offset: args.offset,
            limit: args.limit,
            has_more,
        }
    }

    /// Creates a new [`Page`] out of nodes fetched with the
    /// [`Arguments::fetch_limit()`].
    ///
    /// The extra node (if any) is dropped and only indicates that there are
    /// more nodes.
    #[must_use]
    pub fn from_overfetched(
        args: &Arguments,
        nodes: impl IntoIterator<Item = impl Into<I>>,
    ) -> Self {
        let mut nodes = nodes
            .into_iter()
            .map(Into::into)
            .take(args.fetch_limit())
            .collect::<Vec<_>>();
        let has_more = nodes.len() > args.limit;
        nodes.truncate(args.limit);
        Self {
            nodes,
            offset: args.offset,
            limit: args.limit,
            has_more,
        }
    }

    /// Maps nodes of this [`Page`] with the provided function.
    #[must_use]
    pub fn map<T>(self, f: impl FnMut(I) -> T) -> Page<T> {
        Page {
            nodes: self.nodes.into_iter().map(f).collect(),
            offset: self.offset,
            limit: self.limit,
            has_more: self.has_more,
        }
    }
}

/// Pagination arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Number of items to skip.
    pub offset: usize,

    /// Number of items to return.
    pub limit: usize,
}

impl Arguments {
    /// Default number of items on a page.
    pub const DEFAULT_LIMIT: usize = 10;

    /// Maximum number of items on a page.
    pub const MAX_LIMIT: usize = 100;

    /// Creates new [`Arguments`] out of the requested `skip` and `limit`.
    ///
    /// [`None`] is returned if any of the values is negative, the `limit` is
    /// zero or exceeds the [`Arguments::MAX_LIMIT`].
    pub fn new<Num>(skip: Option<Num>, limit: Option<Num>) -> Option<Self>
    where
        Num: TryInto<usize>,
    {
        let offset: Option<usize> =
            skip.map(TryInto::try_into).transpose().ok()?;
        let limit: Option<usize> =
            limit.map(TryInto::try_into).transpose().ok()?;
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        (limit > 0 && limit <= Self::MAX_LIMIT).then_some(Self {
            offset: offset.unwrap_or_default(),
            limit,
        })
    }

    /// Returns the number of items to fetch to detect whether there are more
    /// items after the requested page.
    #[must_use]
    pub const fn fetch_limit(&self) -> usize {
        self.limit + 1
    }

    /// Applies these [`Arguments`] to the provided ordered items.
    pub fn apply<I>(&self, items: impl IntoIterator<Item = I>) -> Page<I> {
        Page::from_overfetched(
            self,
            items.into_iter().skip(self.offset).take(self.fetch_limit()),
        )
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter>;
    };
}

#[cfg(test)]
mod spec {
    use super::{Arguments, Page};

    #[test]
    fn defaults() {
        assert_eq!(
            Arguments::new::<i64>(None, None),
            Some(Arguments {
                offset: 0,
                limit: 10,
            }),
        );
        assert_eq!(
            Arguments::new(Some(20), Some(5)),
            Some(Arguments {
                offset: 20,
                limit: 5,
            }),
        );
    }

    #[test]
    fn rejects_invalid_arguments() {
        assert_eq!(Arguments::new(Some(-1), Some(10)), None);
        assert_eq!(Arguments::new(Some(0), Some(0)), None);
        assert_eq!(Arguments::new(Some(0), Some(-5)), None);
        assert_eq!(Arguments::new(Some(0), Some(101)), None);
        assert!(Arguments::new(Some(0), Some(100)).is_some());
    }

    #[test]
    fn detects_more_nodes() {
        let args = Arguments {
            offset: 0,
            limit: 2,
        };

        let page = Page::<u8>::from_overfetched(&args, [1_u8, 2, 3]);
        assert_eq!(page.nodes, [1, 2]);
        assert!(page.has_more);

        let page = Page::<u8>::from_overfetched(&args, [1_u8, 2]);
        assert_eq!(page.nodes, [1, 2]);
        assert!(!page.has_more);
    }

    #[test]
    fn applies_offset() {
        let args = Arguments {
            offset: 3,
            limit: 2,
        };

        let page = args.apply(1..=6);
        assert_eq!(page.nodes, [4, 5]);
        assert_eq!(page.offset, 3);
        assert!(page.has_more);

        let page = Arguments {
            offset: 4,
            limit: 2,
        }
        .apply(1..=6);
        assert_eq!(page.nodes, [5, 6]);
        assert!(!page.has_more);

        let page = Arguments {
            offset: 10,
            limit: 2,
        }
        .apply(1..=6);
        assert!(page.nodes.is_empty());
        assert!(!page.has_more);
    }
}
