use tally_database_types::{ConnectionQueryArgs, CursorCodec};

use crate::{GraphqlError, GraphqlResult};

/// Where a window starts, relative to the row a cursor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorBound {
    /// Rows strictly after the row with this id.
    After(i64),
    /// Rows strictly before the row with this id.
    Before(i64),
}

/// Validated pagination arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    pub limit: Option<i64>,
    pub bound: Option<CursorBound>,
}

impl Paging {
    /// Whether the window is read backward from its cursor, in which case
    /// the fetched rows arrive in descending order.
    pub fn is_backward(&self) -> bool {
        matches!(self.bound, Some(CursorBound::Before(_)))
    }

    pub fn cursor_id(&self) -> Option<i64> {
        match self.bound {
            Some(CursorBound::After(id)) | Some(CursorBound::Before(id)) => Some(id),
            None => None,
        }
    }
}

impl TryFrom<&ConnectionQueryArgs> for Paging {
    type Error = GraphqlError;

    fn try_from(args: &ConnectionQueryArgs) -> GraphqlResult<Self> {
        if args.first.is_some() && args.before.is_some() {
            return Err(GraphqlError::InvalidArguments(
                "`first` cannot be combined with `before`".to_string(),
            ));
        }

        if args.last.is_some() && args.after.is_some() {
            return Err(GraphqlError::InvalidArguments(
                "`last` cannot be combined with `after`".to_string(),
            ));
        }

        let limit = args
            .first
            .or(args.last)
            .map(|n| {
                i64::try_from(n).map_err(|_| {
                    GraphqlError::InvalidArguments(format!("Page size {n} is too large"))
                })
            })
            .transpose()?;

        // `after` wins when both cursors are present.
        let bound = match (&args.after, &args.before) {
            (Some(after), _) => Some(CursorBound::After(CursorCodec::decode(after)?)),
            (None, Some(before)) => {
                Some(CursorBound::Before(CursorCodec::decode(before)?))
            }
            (None, None) => None,
        };

        Ok(Paging { limit, bound })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_yield_an_unbounded_window() {
        let paging = Paging::try_from(&ConnectionQueryArgs::default()).unwrap();
        assert_eq!(paging, Paging::default());
        assert!(!paging.is_backward());
    }

    #[test]
    fn test_mixed_directions_are_rejected() {
        let first_before = ConnectionQueryArgs::default().first(1).before("Mg==");
        let last_after = ConnectionQueryArgs::default().last(1).after("Mg==");

        for args in [first_before, last_after] {
            assert!(matches!(
                Paging::try_from(&args),
                Err(GraphqlError::InvalidArguments(_))
            ));
        }
    }

    #[test]
    fn test_limit_prefers_first_over_last() {
        let args = ConnectionQueryArgs::default().first(2).last(5);
        assert_eq!(Paging::try_from(&args).unwrap().limit, Some(2));

        let args = ConnectionQueryArgs::default().last(5);
        assert_eq!(Paging::try_from(&args).unwrap().limit, Some(5));
    }

    #[test]
    fn test_oversized_limit_is_rejected() {
        let args = ConnectionQueryArgs::default().first(u64::MAX);
        assert!(matches!(
            Paging::try_from(&args),
            Err(GraphqlError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_cursors_are_decoded() {
        let args = ConnectionQueryArgs::default().last(1).before("Mg==");
        let paging = Paging::try_from(&args).unwrap();
        assert_eq!(paging.bound, Some(CursorBound::Before(2)));
        assert!(paging.is_backward());
        assert_eq!(paging.cursor_id(), Some(2));

        let args = ConnectionQueryArgs::default().after("not a cursor");
        assert!(matches!(
            Paging::try_from(&args),
            Err(GraphqlError::InvalidCursor(_))
        ));
    }
}
