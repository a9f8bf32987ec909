use std::sync::{Arc, Mutex};
use std::time::Duration;
use serde_json::{json, Value};
use tonx_adapter::family::{Explorer, Gateway};
use tonx_adapter::schema::{Account, AccountState, CommonMessageInfo, TupleItem, Validate};
use tonx_adapter::{AdapterError, Address, Request, TonClient, Transport};

type Issued = Arc<Mutex<Vec<Request>>>;

fn fixture<F>(respond: F) -> (Arc<dyn Transport>, Issued)
    where F: Fn(&Request) -> Value + Send + Sync + 'static
{
    let respond = Arc::new(respond);
    let issued = Issued::default();
    let recorder = issued.clone();

    let service = tower::service_fn(move |request: Request| {
        let response = respond(&request);
        recorder.lock().unwrap().push(request);

        async move { Ok::<Value, AdapterError>(response) }
    });

    (Arc::new(service), issued)
}

fn gateway(transport: Arc<dyn Transport>) -> TonClient {
    TonClient::new(Arc::new(Gateway::new(Duration::ZERO, Duration::ZERO)), transport)
}

fn explorer(transport: Arc<dyn Transport>) -> TonClient {
    TonClient::new(Arc::new(Explorer::new(Duration::ZERO, Duration::ZERO)), transport)
}

fn kinds(issued: &Issued) -> Vec<String> {
    issued.lock().unwrap().iter().map(|r| r.kind().to_owned()).collect()
}

fn params(request: &Request) -> Value {
    match request {
        Request::Rpc(body) => body.params.clone().unwrap_or(Value::Null),
        Request::Post { body, .. } => body.clone(),
        Request::Get { query, .. } => query.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect()
    }
}

const ALICE: &str = "EQCjk1hh952vWaE9bRguFkAhDAL5jj3xj9p0uPWrFBq_GEMS";
const ALICE_RAW: &str = "0:a3935861f79daf59a13d6d182e1640210c02f98e3df18fda74b8f5ab141abf18";
const BOB: &str = "EQB5HQfjevz9su4ZQGcDT_4IB0IUGh5PM2vAXPU2e4O6_d2j";

fn alice() -> Address {
    ALICE.parse().unwrap()
}

fn masterchain_info(seqno: Value) -> Value {
    json!({"ok": true, "result": {
        "first": {"file_hash": "ff", "root_hash": "rr"},
        "last": {"file_hash": "f", "root_hash": "r", "seqno": seqno, "shard": "8000000000000000", "workchain": -1}
    }})
}

fn address_information() -> Value {
    json!({"ok": true, "result": {
        "state": "active",
        "balance": "1000000000",
        "code": "te6ccgEBAQEAAgAAAA==",
        "data": "te6ccgEBAQEAAgAAAA==",
        "frozen_hash": "",
        "last_transaction_id": {"lt": "47000000000002", "hash": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAQI="},
        "block_id": {"workchain": -1, "shard": "8000000000000000", "seqno": 42, "root_hash": "r", "file_hash": "f"}
    }})
}

#[tokio::test]
async fn last_block_shard_is_signed() {
    let (transport, issued) = fixture(|_| masterchain_info(json!(42)));

    let block = gateway(transport).get_last_block().await.unwrap();

    assert_eq!(block.last.shard, "-9223372036854775808");
    assert_eq!(block.last.seqno, 42);
    assert_eq!(kinds(&issued), vec!["getMasterchainInfo"]);
}

#[tokio::test]
async fn last_block_with_bad_seqno_is_malformed() {
    let (transport, _) = fixture(|_| masterchain_info(json!("forty-two")));

    let error = gateway(transport).get_last_block().await.unwrap_err();

    assert!(matches!(error, AdapterError::MalformedResponse(reason) if reason.contains("getMasterchainInfo")));
}

#[tokio::test]
async fn block_out_of_scope_when_shards_fail() {
    let (transport, issued) = fixture(|_| json!({"ok": false, "error": "block not found"}));

    let error = gateway(transport).get_block(42).await.unwrap_err();

    assert!(matches!(error, AdapterError::BlockOutOfScope));
    assert_eq!(kinds(&issued), vec!["shards"]);
}

#[tokio::test]
async fn block_is_masterchain_first() {
    let (transport, issued) = fixture(|request| match request.kind() {
        "shards" => json!({"ok": true, "result": {"shards": [{"workchain": 0, "shard": "2000000000000000", "seqno": 77}]}}),
        _ => {
            let p = params(request);

            json!({"ok": true, "result": {
                "id": {"workchain": p["workchain"], "shard": p["shard"], "seqno": p["seqno"], "root_hash": "r", "file_hash": "f"},
                "transactions": [{"account": ALICE_RAW, "hash": "aGFzaA==", "lt": "47000000000001"}]
            }})
        }
    });

    let block = gateway(transport).get_block(42).await.unwrap();

    assert_eq!(kinds(&issued), vec!["shards", "getBlockTransactions", "getBlockTransactions"]);
    assert_eq!(block.shards.len(), 2);
    assert_eq!((block.shards[0].id.workchain, block.shards[0].id.shard.as_str(), block.shards[0].id.seqno), (-1, "-9223372036854775808", 42));
    assert_eq!((block.shards[1].id.workchain, block.shards[1].id.shard.as_str(), block.shards[1].id.seqno), (0, "2305843009213693952", 77));
    assert_eq!(block.shards[1].transactions[0].account, ALICE);
}

#[tokio::test]
async fn block_by_utime_unknown_time() {
    let (transport, issued) = fixture(|_| json!({"ok": false, "error": "not in db"}));

    let error = gateway(transport).get_block_by_utime(1700000000).await.unwrap_err();

    assert!(matches!(error, AdapterError::BlockOutOfScope));
    assert_eq!(kinds(&issued), vec!["lookupBlock"]);
}

#[tokio::test]
async fn account_validates_twice() {
    let (transport, issued) = fixture(|_| address_information());

    let account = gateway(transport).get_account(42, &alice()).await.unwrap();

    assert!(account.account.state.is_active());
    assert_eq!(account.block.shard, "-9223372036854775808");
    assert!(account.validate().is_ok());

    let json = serde_json::to_value(&account).unwrap();
    let again: Account = serde_json::from_value(json).unwrap();

    assert_eq!(again, account);
    assert!(again.validate().is_ok());
    assert_eq!(params(&issued.lock().unwrap()[0]), json!({"address": ALICE}));
}

#[tokio::test]
async fn unknown_status_is_frozen() {
    let (transport, _) = fixture(|_| {
        let mut response = address_information();
        response["result"]["state"] = json!("deleted");
        response["result"]["frozen_hash"] = json!("c3RhdGU=");

        response
    });

    let account = gateway(transport).get_account(42, &alice()).await.unwrap();

    assert_eq!(account.account.state, AccountState::Frozen { state_hash: "c3RhdGU=".to_owned() });
}

#[tokio::test]
async fn account_change_and_deploy() {
    let (transport, _) = fixture(|_| address_information());
    let client = gateway(transport);

    assert!(!client.is_account_changed(42, &alice(), 47000000000002).await.unwrap().changed);
    assert!(client.is_account_changed(42, &alice(), 47000000000001).await.unwrap().changed);
    assert!(client.is_contract_deployed(42, &alice()).await.unwrap());
}

fn transactions_page() -> Value {
    json!({"ok": true, "result": [{
        "account": ALICE_RAW,
        "hash": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAQI=",
        "lt": "47000000000002",
        "now": 1700000000,
        "orig_status": "active",
        "end_status": "active",
        "total_fees": "1000",
        "prev_trans_hash": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAQE=",
        "prev_trans_lt": "47000000000001",
        "description": {"type": "ord", "aborted": false},
        "block_ref": {"workchain": 0, "shard": "8000000000000000", "seqno": 100},
        "in_msg": {
            "source": BOB,
            "destination": ALICE_RAW,
            "value": "100000",
            "ihr_disabled": false,
            "bounce": true,
            "bounced": false,
            "created_lt": "47000000000001",
            "created_at": "1700000000"
        },
        "out_msgs": [
            {"source": ALICE_RAW, "destination": BOB, "value": "5", "ihr_disabled": false, "created_lt": "47000000000003", "created_at": "1700000000"},
            {"source": ALICE_RAW, "destination": null, "ihr_disabled": true, "created_lt": "47000000000004", "created_at": "1700000000"}
        ],
        "account_state_hash_before": "AQI=",
        "account_state_hash_after": "AwQ="
    }]})
}

#[tokio::test]
async fn transactions_classify_messages() {
    let (transport, issued) = fixture(|_| transactions_page());

    let page = gateway(transport)
        .get_account_transactions(&alice(), 47000000000002, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAQI=", Some(10))
        .await
        .unwrap();

    let tx = &page[0].tx;
    assert!(tx.in_message.as_ref().is_some_and(|m| m.info.is_internal()));
    assert!(tx.out_messages[0].info.is_internal());
    assert!(matches!(tx.out_messages[1].info, CommonMessageInfo::ExternalOut { dest: None, .. }));

    let sent = params(&issued.lock().unwrap()[0]);
    assert_eq!(sent["end_lt"], json!(47000000000002u64));
    assert_eq!(sent["limit"], json!(10));
    assert_eq!(sent["sort"], "DESC");
}

#[tokio::test]
async fn parsed_transactions_are_incoming() {
    let (transport, _) = fixture(|_| transactions_page());

    let parsed = gateway(transport)
        .get_account_transactions_parsed(&alice(), 47000000000002, "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAQI=", None)
        .await
        .unwrap();

    assert_eq!(parsed.transactions.len(), 1);
    assert_eq!(parsed.blocks.len(), 1);
    assert_eq!(serde_json::to_value(&parsed.transactions[0].parsed.kind).unwrap(), json!("in"));
}

#[tokio::test]
async fn description_without_type_is_malformed() {
    let (transport, _) = fixture(|_| {
        let mut page = transactions_page();
        page["result"][0]["description"] = json!({"aborted": false});

        page
    });

    let error = gateway(transport)
        .get_account_transactions(&alice(), 47000000000002, "", None)
        .await
        .unwrap_err();

    assert!(matches!(error, AdapterError::MalformedResponse(reason) if reason.contains("description")));
}

#[tokio::test]
async fn bad_counterparty_address_is_surfaced() {
    let (transport, _) = fixture(|_| {
        let mut page = transactions_page();
        page["result"][0]["in_msg"]["source"] = json!("badaddress");

        page
    });

    let error = gateway(transport)
        .get_account_transactions(&alice(), 47000000000002, "", None)
        .await
        .unwrap_err();

    assert!(matches!(error, AdapterError::InvalidAddressFormat(_)));
}

#[tokio::test]
async fn config_forwards_first_id_only() {
    let (transport, issued) = fixture(|_| json!({"ok": true, "result": {"config": {"bytes": "te6ccgEBAQEAAgAAAA=="}}}));

    let config = gateway(transport).get_config(42, &[34, 36]).await.unwrap();

    assert_eq!(config.config.cell, "te6ccgEBAQEAAgAAAA==");
    assert_eq!(config.config.address, "");
    assert_eq!(config.config.global_balance.coins, "");

    let issued = issued.lock().unwrap();
    assert_eq!(issued[0], Request::get("getConfigParam", [("seqno", "42"), ("config_id", "34")]));
}

#[tokio::test]
async fn run_method_returns_exit_code_as_data() {
    let (transport, issued) = fixture(|request| match request.kind() {
        "runGetMethod" => json!({"ok": true, "result": {"exit_code": 7, "stack": [["num", "0x2a"], ["tvm.Cell", "te6ccgEBAQEAAgAAAA=="]]}}),
        _ => address_information()
    });

    let result = gateway(transport)
        .run_method(42, &alice(), "seqno", &[TupleItem::Int { value: 5.into() }])
        .await
        .unwrap();

    assert_eq!(result.exit_code, 7);
    assert!(!result.is_success());
    assert_eq!(result.result[0], TupleItem::Int { value: 42.into() });
    assert_eq!(result.block.seqno, 42);
    assert_eq!(result.shard_block.workchain, -2);
    assert_eq!(kinds(&issued), vec!["runGetMethod", "getAddressInformation"]);
    assert_eq!(params(&issued.lock().unwrap()[0])["stack"], json!([["num", "0x5"]]));
}

#[tokio::test]
async fn send_message_encodes_boc() {
    let (transport, issued) = fixture(|_| json!({"ok": true, "result": {"@type": "ok"}}));

    let result = gateway(transport).send_message(&[1, 2, 3]).await.unwrap();

    assert_eq!(result.status, 1);
    assert_eq!(params(&issued.lock().unwrap()[0]), json!({"boc": "AQID"}));
}

#[tokio::test]
async fn transport_failure_is_not_malformed() {
    let transport: Arc<dyn Transport> = Arc::new(tower::service_fn(|_: Request| async {
        Err::<Value, _>(AdapterError::UpstreamTransportFailure(anyhow::anyhow!("503 Service Unavailable")))
    }));

    let error = gateway(transport).get_last_block().await.unwrap_err();

    assert!(error.is_transport());
}

#[tokio::test]
async fn explorer_block_out_of_scope() {
    let (transport, issued) = fixture(|_| json!({"blocks": []}));

    let error = explorer(transport).get_block(42).await.unwrap_err();

    assert!(matches!(error, AdapterError::BlockOutOfScope));
    assert_eq!(kinds(&issued), vec!["masterchainBlockShards"]);
}

#[tokio::test]
async fn explorer_block_fetches_each_listed_block() {
    let (transport, issued) = fixture(|request| match request.kind() {
        "masterchainBlockShards" => json!({"blocks": [
            {"workchain": 0, "shard": "8000000000000000", "seqno": 70},
            {"workchain": -1, "shard": "8000000000000000", "seqno": 42}
        ]}),
        _ => json!({"transactions": []})
    });

    let block = explorer(transport).get_block(42).await.unwrap();

    assert_eq!(kinds(&issued), vec!["masterchainBlockShards", "transactions", "transactions"]);
    assert_eq!(block.shards[0].id.workchain, -1);
    assert_eq!(block.shards[1].id.seqno, 70);
    assert_eq!(params(&issued.lock().unwrap()[1])["workchain"], "-1");
}

#[tokio::test]
async fn explorer_account_uses_masterchain_block() {
    let (transport, issued) = fixture(|request| match request.kind() {
        "blocks" => json!({"blocks": [{"workchain": -1, "shard": "8000000000000000", "seqno": 42, "root_hash": "r", "file_hash": "f"}]}),
        _ => json!({"accounts": [{"address": ALICE_RAW, "status": "nonexist"}]})
    });

    let account = explorer(transport).get_account(42, &alice()).await.unwrap();

    assert_eq!(account.account.state, AccountState::Uninit);
    assert_eq!(account.block.seqno, 42);
    assert_eq!(kinds(&issued), vec!["blocks", "accountStates"]);
}

#[tokio::test]
async fn explorer_has_no_config() {
    let (transport, issued) = fixture(|_| Value::Null);

    let error = explorer(transport).get_config(42, &[]).await.unwrap_err();

    assert!(matches!(error, AdapterError::Unsupported(_)));
    assert!(issued.lock().unwrap().is_empty());
}
