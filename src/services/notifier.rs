use crate::db::notifications::notify_user;
use crate::db::{DbConnection, NotificationOperations, RepositoryError, StoreOperations};
use actix_web::web;
use log::warn;
use tokio::sync::mpsc;

/// Order lifecycle events fanned out as user notifications.
#[derive(Debug)]
pub enum OrderEvent {
    Placed {
        order_id: i32,
        store_id: i32,
        total_amount: f64,
    },
    Confirmed {
        order_id: i32,
        store_id: i32,
        customer_id: i32,
    },
    Cancelled {
        order_id: i32,
        store_id: i32,
    },
    Completed {
        order_id: i32,
        customer_id: i32,
        total_amount: f64,
    },
}

/// Outbound notification queue. Sending is fire-and-forget: delivery
/// happens on a background task and a failure is logged, never surfaced
/// to the operation that produced the event.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<OrderEvent>,
}

impl Notifier {
    pub fn spawn(notification_ops: NotificationOperations, store_ops: StoreOperations) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<OrderEvent>();

        actix_web::rt::spawn(async move {
            while let Some(event) = rx.recv().await {
                let ops = notification_ops.clone();
                let stores = store_ops.clone();
                match web::block(move || deliver(&ops, &stores, event)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("notifier: failed to deliver event: {}", e),
                    Err(e) => warn!("notifier: blocking error: {}", e),
                }
            }
        });

        Self { tx }
    }

    pub fn send(&self, event: OrderEvent) {
        if self.tx.send(event).is_err() {
            warn!("notifier: outbound queue closed; dropping event");
        }
    }
}

fn deliver(
    ops: &NotificationOperations,
    stores: &StoreOperations,
    event: OrderEvent,
) -> Result<(), RepositoryError> {
    let mut conn = DbConnection::new(ops.pool())?;

    match event {
        OrderEvent::Placed {
            order_id,
            store_id,
            total_amount,
        } => {
            let store = stores.get_store_by_id(store_id)?;
            notify_user(
                conn.connection(),
                store.owner_id,
                "New order received",
                &format!("Order #{order_id} was placed for a total of {total_amount:.2}."),
            )
        }
        OrderEvent::Confirmed {
            order_id,
            store_id,
            customer_id,
        } => {
            let store = stores.get_store_by_id(store_id)?;
            notify_user(
                conn.connection(),
                store.owner_id,
                "Order confirmed",
                &format!("You confirmed order #{order_id}."),
            )?;
            notify_user(
                conn.connection(),
                customer_id,
                "Order accepted",
                &format!("Your order #{order_id} was accepted by {}.", store.name),
            )
        }
        OrderEvent::Cancelled { order_id, store_id } => {
            let store = stores.get_store_by_id(store_id)?;
            notify_user(
                conn.connection(),
                store.owner_id,
                "Order cancelled",
                &format!("Order #{order_id} was cancelled."),
            )
        }
        OrderEvent::Completed {
            order_id,
            customer_id,
            total_amount,
        } => notify_user(
            conn.connection(),
            customer_id,
            "Order completed",
            &format!("Order #{order_id} was picked up; {total_amount:.2} was charged."),
        ),
    }
}
