use actor_framework::tracing::setup_tracing;
use retail::checkout::PlaceOrder;
use retail::config::ShopConfig;
use retail::error::Rejection;
use retail::fulfillment::PaymentDetails;
use retail::identity::Principal;
use retail::lifecycle::ShopSystem;
use retail::model::{Address, CustomerCreate, OrderStatus, PaymentMethod, ProductCreate};
use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = ShopConfig::from_env()?;
    info!(?config, "Starting shop");
    let system = ShopSystem::new(config);

    let shopper = system
        .customer_client
        .register(CustomerCreate::shopper("Asha Rao", "asha@example.com"))
        .await?;
    let clerk = system
        .customer_client
        .register(CustomerCreate {
            name: "Dev Mehta".to_string(),
            email: "dev@example.com".to_string(),
            role: retail::identity::Role::Staff,
        })
        .await?;
    info!(customer = %shopper.id, landing = shopper.role.landing_path(), "Signed in");

    let kettle = system
        .product_client
        .create_product(ProductCreate::new("Kettle", Decimal::from(100), 12).brand("Brewline"))
        .await?;
    let mug = system
        .product_client
        .create_product(ProductCreate::new("Mug", Decimal::from(50), 40).color("Teal"))
        .await?;

    let span = tracing::info_span!("shopping", customer = %shopper.id);
    let cart = async {
        system.cart_client.add_item(shopper.id, kettle.id, 5).await?;
        system.cart_client.add_item(shopper.id, mug.id, 2).await
    }
    .instrument(span)
    .await?;
    info!(subtotal = %cart.totals.subtotal, total = %cart.totals.final_amount, "Cart ready");

    let preview = system.checkout.initiate(shopper.id).await?;
    info!(total = %preview.totals.final_amount, "Checkout preview");

    let address = Address {
        full_name: shopper.name.clone(),
        line1: "12 MG Road".to_string(),
        line2: None,
        city: "Pune".to_string(),
        state: "MH".to_string(),
        postal_code: "411001".to_string(),
        country: "IN".to_string(),
        phone: None,
    };
    let span = tracing::info_span!("order_processing", customer = %shopper.id);
    let order = async {
        system
            .checkout
            .place_order(
                shopper.id,
                PlaceOrder {
                    shipping_address: Some(address),
                    payment_method: Some(PaymentMethod::Card),
                    ..PlaceOrder::default()
                },
            )
            .await
    }
    .instrument(span)
    .await?;
    info!(order_number = %order.order_number, status = %order.status, "Order placed");

    let customer = Principal::customer(shopper.id);
    match system
        .order_service
        .process_payment(
            customer,
            order.order_number.clone(),
            PaymentDetails {
                method: PaymentMethod::Card,
                payer_reference: Some("**** 4242".to_string()),
            },
        )
        .await
    {
        Ok(paid) => info!(payment_status = ?paid.payment_status, status = %paid.status, "Payment processed"),
        Err(e) => {
            let rejection = Rejection::from_error(&e);
            error!(status = rejection.status, message = %rejection.message, "Payment failed");
        }
    }

    let staff = Principal::staff(clerk.id);
    if let Err(e) = system
        .order_service
        .advance(staff, order.order_number.clone(), OrderStatus::Processing, None)
        .await
    {
        let rejection = Rejection::from_error(&e);
        error!(status = rejection.status, message = %rejection.message, "Could not start processing");
    }

    let snapshot = system.snapshot().await?;
    info!(bytes = snapshot.to_json()?.len(), "Snapshot taken");

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
