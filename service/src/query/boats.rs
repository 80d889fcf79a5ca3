//! [`Query`] collection related to the multiple [`Boat`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::Boat,
    infra::{database, Database},
    read, Query, Service,
};

use super::DatabaseQuery;

/// Queries a list of [`Boat`]s.
pub type List =
    DatabaseQuery<By<read::boat::list::Page, read::boat::list::Selector>>;

/// Queries total count of [`Boat`]s.
pub type TotalCount = DatabaseQuery<By<read::boat::list::TotalCount, ()>>;

/// Queries all the active [`Boat`]s along with their price lists.
pub type Priced = DatabaseQuery<By<Vec<Boat>, read::boat::Active>>;

/// [`Query`] of a list of [`Boat`]s accepting reservations right now.
#[derive(Clone, Copy, Debug, Default)]
pub struct Available {
    /// Pagination arguments.
    pub arguments: read::boat::list::Arguments,
}

impl<Db> Query<Available> for Service<Db>
where
    Db: Database<
        Select<By<read::boat::list::Page, read::boat::list::Selector>>,
        Ok = read::boat::list::Page,
        Err = Traced<database::Error>,
    >,
{
    type Ok = read::boat::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Available { arguments }: Available,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(List::by(read::boat::list::Selector {
            arguments,
            filter: read::boat::list::Filter {
                name: None,
                is_active: Some(true),
                has_available_seats: true,
            },
        }))
        .await
        .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::UpdateBoatActivity, domain::boat, fixture, read, Command as _,
    };

    use super::{Available, List, Priced, TotalCount};

    #[tokio::test]
    async fn lists_in_registration_order_with_filters() {
        let svc = fixture::service();
        let pearl = fixture::active_boat(&svc, "Sea Pearl", 2).await;
        let queen = svc
            .execute(fixture::register_boat("River Queen", 4))
            .await
            .unwrap();
        _ = fixture::active_boat(&svc, "Pearl Harbour", 3).await;

        let page = svc
            .execute(List::by(read::boat::list::Selector {
                arguments: read::boat::list::Arguments {
                    offset: 0,
                    limit: 2,
                },
                filter: read::boat::list::Filter::default(),
            }))
            .await
            .unwrap();
        assert_eq!(
            page.nodes.iter().map(|b| b.id).collect::<Vec<_>>(),
            [pearl.id, queen.id],
        );
        assert!(page.has_more);

        let page = svc
            .execute(List::by(read::boat::list::Selector {
                arguments: read::boat::list::Arguments::default(),
                filter: read::boat::list::Filter {
                    name: boat::Name::new("pearl"),
                    ..read::boat::list::Filter::default()
                },
            }))
            .await
            .unwrap();
        assert_eq!(page.nodes.len(), 2);
        assert!(!page.has_more);

        let page = svc
            .execute(List::by(read::boat::list::Selector {
                arguments: read::boat::list::Arguments::default(),
                filter: read::boat::list::Filter {
                    is_active: Some(false),
                    ..read::boat::list::Filter::default()
                },
            }))
            .await
            .unwrap();
        assert_eq!(
            page.nodes.iter().map(|b| b.id).collect::<Vec<_>>(),
            [queen.id],
        );

        let total = svc.execute(TotalCount::by(())).await.unwrap();
        assert_eq!(i32::from(total), 3);
    }

    #[tokio::test]
    async fn available_excludes_inactive_and_sold_out_boats() {
        let svc = fixture::service();
        let pearl = fixture::active_boat(&svc, "Sea Pearl", 1).await;
        let queen = fixture::active_boat(&svc, "River Queen", 4).await;
        let swan = fixture::active_boat(&svc, "White Swan", 4).await;
        _ = fixture::reserve(&svc, "Sea Pearl").await.unwrap();
        _ = svc
            .execute(UpdateBoatActivity {
                boat_id: swan.id,
                is_active: false,
            })
            .await
            .unwrap();

        let page = svc.execute(Available::default()).await.unwrap();
        assert_eq!(
            page.nodes.iter().map(|b| b.id).collect::<Vec<_>>(),
            [queen.id],
        );

        let priced = svc.execute(Priced::by(read::boat::Active)).await.unwrap();
        assert_eq!(
            priced.iter().map(|b| b.id).collect::<Vec<_>>(),
            [pearl.id, queen.id],
        );
    }
}
