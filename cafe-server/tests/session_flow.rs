//! Full protocol round trips over a real TCP socket.

mod common;

use cafe_server::db::repository::order;
use cafe_server::message::codec::{read_message, write_message};
use cafe_server::Server;
use common::{dec, seed_menu, test_state, TestEnv};
use serde_json::json;
use shared::message::{RequestPayload, ResponsePayload};
use shared::models::{BillDetails, BillSummary, OrderStatus, OrderSummary, PaymentRecord};
use tokio::net::TcpStream;

/// Bind an ephemeral port, start the accept loop, and connect a client.
async fn start_server(env: &TestEnv) -> TcpStream {
    let server = Server::with_state(env.state.config.clone(), env.state.clone());
    let listener = server.bind().await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(Server::serve(env.state.clone(), listener));
    TcpStream::connect(("127.0.0.1", port)).await.unwrap()
}

async fn send(
    stream: &mut TcpStream,
    action: &str,
    data: Option<serde_json::Value>,
) -> ResponsePayload {
    write_message(stream, &RequestPayload::new(action, data))
        .await
        .unwrap();
    read_message::<_, ResponsePayload>(stream)
        .await
        .unwrap()
        .expect("server closed connection unexpectedly")
}

#[tokio::test]
async fn ping_answers_pong() {
    let env = test_state().await;
    let mut client = start_server(&env).await;

    let resp = send(&mut client, "PING", None).await;
    assert!(resp.success);
    assert_eq!(resp.message, "Pong");
}

#[tokio::test]
async fn full_billing_flow_over_tcp() {
    let env = test_state().await;
    let ids = seed_menu(&env.state, &[("Latte", "3.50"), ("Cheesecake", "4.25")]).await;
    let mut client = start_server(&env).await;

    // 下单
    let resp = send(
        &mut client,
        "CREATE_ORDER",
        Some(json!({
            "order_type": "DineIn",
            "employee_id": 7,
            "items": [
                { "menu_item_id": ids[0], "quantity": 2 },
                { "menu_item_id": ids[1], "quantity": 1 },
            ],
        })),
    )
    .await;
    assert!(resp.success, "{}", resp.message);
    let summary: OrderSummary = resp.parse_data().unwrap();
    assert_eq!(summary.total, dec("11.25"));

    // 备餐完成由外部系统驱动，这里直接落库
    order::set_status(&env.state.db.pool, summary.order_id, OrderStatus::Ready)
        .await
        .unwrap();

    // 开票
    let resp = send(
        &mut client,
        "GENERATE_BILL",
        Some(json!({ "order_id": summary.order_id, "discount": "1.25" })),
    )
    .await;
    assert!(resp.success, "{}", resp.message);
    let bill: BillSummary = resp.parse_data().unwrap();
    assert_eq!(bill.total, dec("11.25"));
    assert_eq!(bill.tax, dec("1.00"));
    assert_eq!(bill.final_amount, dec("11.00"));

    // 支付
    let resp = send(
        &mut client,
        "MAKE_PAYMENT",
        Some(json!({ "bill_id": bill.bill_id, "method": "card", "amount": "11.00" })),
    )
    .await;
    assert!(resp.success, "{}", resp.message);
    let record: PaymentRecord = resp.parse_data().unwrap();
    assert!(record.transaction_id.starts_with("CARD-"));

    // 账单明细: 已结清
    let resp = send(
        &mut client,
        "GET_BILL_DETAILS",
        Some(json!({ "bill_id": bill.bill_id })),
    )
    .await;
    assert!(resp.success, "{}", resp.message);
    let details: BillDetails = resp.parse_data().unwrap();
    assert_eq!(details.amount_paid, dec("11.00"));
    assert_eq!(details.balance_due, dec("0.00"));

    // 支付历史
    let resp = send(
        &mut client,
        "GET_PAYMENT_HISTORY",
        Some(json!(bill.bill_id)),
    )
    .await;
    assert!(resp.success, "{}", resp.message);
    let history: Vec<PaymentRecord> = resp.parse_data().unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn unknown_action_keeps_the_connection_usable() {
    let env = test_state().await;
    let mut client = start_server(&env).await;

    let resp = send(&mut client, "SELF_DESTRUCT", None).await;
    assert!(!resp.success);
    assert_eq!(resp.message, "Invalid action");
    assert_eq!(resp.error_code.as_deref(), Some("INVALID_ACTION"));

    // 同一连接继续服务
    let resp = send(&mut client, "PING", None).await;
    assert!(resp.success);
}

#[tokio::test]
async fn responses_follow_request_order() {
    let env = test_state().await;
    let mut client = start_server(&env).await;

    // 先把 5 条请求全部写出 (流水线)，再按序收响应
    for i in 1..=5i64 {
        write_message(
            &mut client,
            &RequestPayload::new("GET_ORDER_TOTAL", Some(json!({ "order_id": i }))),
        )
        .await
        .unwrap();
    }

    for i in 1..=5i64 {
        let resp = read_message::<_, ResponsePayload>(&mut client)
            .await
            .unwrap()
            .unwrap();
        assert!(!resp.success);
        assert!(
            resp.message.contains(&format!("Order {i} not found")),
            "out-of-order response: {}",
            resp.message
        );
    }
}

#[tokio::test]
async fn malformed_frame_closes_only_that_connection() {
    use tokio::io::AsyncWriteExt;

    let env = test_state().await;
    let mut bad_client = start_server(&env).await;

    // 长度前缀声称 8 字节但只发 3 字节就断开
    bad_client.write_all(&8u32.to_le_bytes()).await.unwrap();
    bad_client.write_all(b"abc").await.unwrap();
    bad_client.shutdown().await.unwrap();
    // 服务端最多回一条告别信封然后关闭
    let _ = read_message::<_, ResponsePayload>(&mut bad_client).await;

    // 其他连接不受影响
    let mut client = start_server(&env).await;
    let resp = send(&mut client, "PING", None).await;
    assert!(resp.success);
}
