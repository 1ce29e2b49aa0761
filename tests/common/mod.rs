//! Shared utilities for integration tests: a mock shielded JSON-RPC node.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolValue;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use shielded_query::config::NetworkConfig;
use shielded_query::shielded::NodeKeyPair;

/// `balanceOf(address)` selector.
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// `n` whole tokens at 18 decimals.
pub fn tokens(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

/// How the mock node behaves.
#[derive(Clone)]
pub struct MockNodeOptions {
    pub chain_id: u64,
    pub nonce: u64,
    pub balances: HashMap<Address, U256>,
    /// Served instead of the real key from `eth_getNodePublicKey`.
    pub public_key_override: Option<String>,
    /// Reject `eth_call` with this JSON-RPC error.
    pub call_error: Option<(i64, String)>,
    /// Answer `eth_call` with bytes that are not a valid envelope.
    pub garble_response: bool,
}

impl Default for MockNodeOptions {
    fn default() -> Self {
        Self {
            chain_id: 1291,
            nonce: 5,
            balances: HashMap::new(),
            public_key_override: None,
            call_error: None,
            garble_response: false,
        }
    }
}

/// Handle to a running mock node.
#[allow(dead_code)]
pub struct MockNode {
    pub addr: SocketAddr,
    pub keys: Arc<NodeKeyPair>,
    /// Number of JSON-RPC requests served.
    pub requests: Arc<AtomicU32>,
    /// Methods in the order they arrived.
    pub methods: Arc<Mutex<Vec<String>>>,
    /// Transaction object of the last `eth_call`.
    pub last_call: Arc<Mutex<Option<Value>>>,
}

#[allow(dead_code)]
impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn network(&self) -> NetworkConfig {
        NetworkConfig {
            rpc_url: self.url(),
            rpc_timeout_secs: 5,
            ..NetworkConfig::default()
        }
    }

    pub fn request_count(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }
}

struct NodeState {
    options: MockNodeOptions,
    keys: Arc<NodeKeyPair>,
    requests: Arc<AtomicU32>,
    methods: Arc<Mutex<Vec<String>>>,
    last_call: Arc<Mutex<Option<Value>>>,
}

/// Start a mock node on an ephemeral localhost port.
pub async fn start_mock_node(options: MockNodeOptions) -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = Arc::new(NodeState {
        options,
        keys: Arc::new(NodeKeyPair::generate()),
        requests: Arc::new(AtomicU32::new(0)),
        methods: Arc::new(Mutex::new(Vec::new())),
        last_call: Arc::new(Mutex::new(None)),
    });

    let node = MockNode {
        addr,
        keys: state.keys.clone(),
        requests: state.requests.clone(),
        methods: state.methods.clone(),
        last_call: state.last_call.clone(),
    };

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let state = state.clone();
                    tokio::spawn(async move {
                        let _ = serve_connection(socket, &state).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    node
}

async fn serve_connection(mut socket: TcpStream, state: &NodeState) -> std::io::Result<()> {
    let body = read_http_body(&mut socket).await?;
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state.requests.fetch_add(1, Ordering::SeqCst);
    let response = handle_rpc(&request, state);
    let payload = serde_json::to_vec(&response).unwrap();

    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        payload.len()
    );
    socket.write_all(head.as_bytes()).await?;
    socket.write_all(&payload).await?;
    socket.shutdown().await
}

/// Read one HTTP request and return its body.
async fn read_http_body(socket: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(Vec::new());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(buf[header_end..].to_vec())
}

fn handle_rpc(request: &Value, state: &NodeState) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    state.methods.lock().unwrap().push(method.clone());

    let outcome = match method.as_str() {
        "eth_chainId" => Ok(json!(format!("0x{:x}", state.options.chain_id))),
        "eth_getTransactionCount" => Ok(json!(format!("0x{:x}", state.options.nonce))),
        "eth_getNodePublicKey" => {
            let key = state.options.public_key_override.clone().unwrap_or_else(|| {
                format!("0x{}", hex::encode(state.keys.public_key().as_bytes()))
            });
            Ok(json!(key))
        }
        "eth_call" => handle_call(request, state),
        other => Err((-32601, format!("method {} not found", other))),
    };

    match outcome {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }),
    }
}

fn handle_call(request: &Value, state: &NodeState) -> Result<Value, (i64, String)> {
    let tx = request
        .get("params")
        .and_then(|p| p.get(0))
        .cloned()
        .ok_or((-32602, "missing call object".to_string()))?;
    *state.last_call.lock().unwrap() = Some(tx.clone());

    if let Some((code, message)) = &state.options.call_error {
        return Err((*code, message.clone()));
    }

    let data = tx
        .get("input")
        .or_else(|| tx.get("data"))
        .and_then(Value::as_str)
        .ok_or((-32602, "missing data".to_string()))?;
    let data = hex::decode(data.trim_start_matches("0x"))
        .map_err(|e| (-32602, format!("bad hex: {}", e)))?;

    let (client, calldata) = state
        .keys
        .open_request(&data)
        .map_err(|e| (-32000, format!("cannot decrypt request: {}", e)))?;

    if calldata.len() != 36 || calldata[..4] != BALANCE_OF_SELECTOR {
        return Err((-32000, "execution reverted".to_string()));
    }
    let account = Address::from_slice(&calldata[16..36]);
    let balance = state
        .options
        .balances
        .get(&account)
        .copied()
        .unwrap_or(U256::ZERO);

    if state.options.garble_response {
        return Ok(json!("0xdeadbeef"));
    }

    let sealed = state
        .keys
        .seal_response(&client, &balance.abi_encode())
        .map_err(|e| (-32000, e.to_string()))?;
    Ok(json!(format!("0x{}", hex::encode(sealed))))
}
