use worker::*;

// Export the Durable Object from server_do
pub use server_do::RoomDO;

const ROOM_CODE_LEN: usize = 5;
const ROOM_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: worker::Context) -> Result<Response> {
    let router = Router::new();

    router
        .get_async("/", handle_index)
        .get_async("/create", handle_create)
        .get_async("/room/:code", handle_room)
        .run(req, env)
        .await
}

async fn handle_index(_req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    Response::from_html(INDEX_HTML)
}

async fn handle_create(_req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    let code = generate_room_code();
    console_log!("Lobby: created room {}", code);
    Response::from_json(&serde_json::json!({ "code": code }))
}

/// Forward the WebSocket upgrade to the room's Durable Object
async fn handle_room(req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let code = ctx.param("code").map_or("", |v| v).to_uppercase();

    if !is_valid_room_code(&code) {
        return Response::error("Invalid room code", 400);
    }

    let namespace = ctx.env.durable_object("ROOM")?;
    let stub = namespace.get_by_name(&code)?;
    stub.fetch_with_request(req).await
}

/// Generate a random room code (A-Z, 0-9)
fn generate_room_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ROOM_CODE_CHARS[rng.gen_range(0..ROOM_CODE_CHARS.len())] as char)
        .collect()
}

pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LEN && code.bytes().all(|b| ROOM_CODE_CHARS.contains(&b))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>3D Pong</title>
    <style>
        html, body { margin: 0; padding: 0; height: 100%; overflow: hidden; background: #000; color: #fff; font-family: monospace; }
        #canvas { display: block; width: 100vw; height: 100vh; cursor: none; }
        #score-display { position: absolute; top: 16px; width: 100%; text-align: center; font-size: 32px; pointer-events: none; }
        #ui { position: absolute; bottom: 16px; width: 100%; text-align: center; }
        #status { margin: 8px 0; color: #aaa; }
        input, button { padding: 8px 16px; margin: 4px; font-family: monospace; font-size: 14px; }
        button { background: #4a9eff; color: white; border: none; border-radius: 4px; cursor: pointer; }
        button:disabled { background: #666; cursor: not-allowed; }
    </style>
</head>
<body>
    <canvas id="canvas"></canvas>
    <div id="score-display"></div>
    <div id="ui">
        <div id="status">Loading WASM...</div>
        <div id="controls">
            <button id="createBtn">Create Room</button>
            <input type="text" id="roomCode" placeholder="Room code" maxlength="5" style="text-transform: uppercase;">
            <button id="joinBtn">Join</button>
        </div>
    </div>
    <script type="module">
        import init, { PongClient } from './pkg/client_wasm.js';

        let client = null;
        let ws = null;

        function updateStatus(msg) {
            document.getElementById('status').textContent = msg;
        }

        function showControls(visible) {
            document.getElementById('controls').style.display = visible ? '' : 'none';
        }

        function flush() {
            if (!client || !ws || ws.readyState !== WebSocket.OPEN) return;
            for (const bytes of client.take_outgoing()) ws.send(bytes);
        }

        function resize() {
            const canvas = document.getElementById('canvas');
            canvas.width = window.innerWidth * devicePixelRatio;
            canvas.height = window.innerHeight * devicePixelRatio;
            if (client) client.resize(window.innerWidth, window.innerHeight);
        }

        function join(code) {
            code = code.trim().toUpperCase();
            if (code.length !== 5) { updateStatus('Room code must be 5 characters'); return; }
            let hello;
            try { hello = client.join_message(code); } catch (err) { updateStatus(String(err)); return; }
            const scheme = location.protocol === 'https:' ? 'wss' : 'ws';
            const socket = new WebSocket(`${scheme}://${location.host}/room/${code}`);
            socket.binaryType = 'arraybuffer';
            socket.onopen = () => { socket.send(hello); updateStatus(`Room ${code}`); };
            socket.onmessage = (e) => {
                client.handle_message(new Uint8Array(e.data));
                const reason = client.rejection();
                if (reason) {
                    socket.onclose = null;
                    socket.close();
                    ws = null;
                    updateStatus(`Room ${code}: ${reason}`);
                    showControls(true);
                }
            };
            socket.onclose = () => {
                client.disconnected();
                ws = null;
                updateStatus('Disconnected');
                showControls(true);
            };
            ws = socket;
            showControls(false);
        }

        async function main() {
            await init();
            const canvas = document.getElementById('canvas');
            resize();
            client = await PongClient.create(canvas);
            resize();
            updateStatus('Ready');

            window.addEventListener('resize', resize);
            window.addEventListener('pointermove', (e) => client.pointer_moved(e.clientX, e.clientY));
            document.getElementById('joinBtn').onclick = () => join(document.getElementById('roomCode').value);
            document.getElementById('createBtn').onclick = async () => {
                const res = await fetch('/create');
                const { code } = await res.json();
                join(code);
            };

            let lastState = '';
            function loop(now) {
                client.frame(now);
                flush();
                const state = client.state_string();
                if (ws && state !== lastState && (state === 'Waiting' || state === 'Playing' || state === 'Ended')) {
                    const rtt = client.rtt_ms();
                    updateStatus(rtt === undefined ? state : `${state} (${rtt} ms)`);
                }
                lastState = state;
                requestAnimationFrame(loop);
            }
            requestAnimationFrame(loop);
        }

        main().catch((error) => {
            console.error('Error:', error);
            updateStatus('Error: ' + error);
        });
    </script>
</body>
</html>"#;
