use axum::response::{Html, IntoResponse};

pub async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Query Your Data</title>
    <style>
        :root {
            --bg: #0f172a;
            --card: #1e293b;
            --text: #f1f5f9;
            --muted: #94a3b8;
            --accent: #3b82f6;
            --danger: #ef4444;
            --info: #0ea5e9;
        }
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            background: var(--bg);
            color: var(--text);
            display: flex;
            min-height: 100vh;
        }
        aside {
            width: 260px;
            background: var(--card);
            padding: 1.5rem;
            border-right: 1px solid rgba(255,255,255,0.1);
        }
        aside label { display: block; color: var(--muted); margin-bottom: 0.5rem; }
        main { flex: 1; padding: 2rem; }
        h1 { margin-bottom: 1.5rem; }
        h2 { font-size: 1.1rem; margin-bottom: 1rem; }
        h4 { margin: 1rem 0 0.5rem; color: var(--muted); }
        .columns { display: grid; grid-template-columns: 1fr 1fr; gap: 2rem; }
        select, textarea {
            width: 100%;
            background: var(--bg);
            color: var(--text);
            border: 1px solid rgba(255,255,255,0.2);
            border-radius: 6px;
            padding: 0.5rem;
            font: inherit;
        }
        textarea { min-height: 6rem; resize: vertical; }
        button {
            margin-top: 0.75rem;
            padding: 0.5rem 1.25rem;
            border: none;
            border-radius: 6px;
            background: var(--accent);
            color: white;
            cursor: pointer;
        }
        button:disabled { opacity: 0.5; cursor: wait; }
        details {
            margin-top: 1.5rem;
            background: var(--card);
            border-radius: 8px;
            padding: 1rem;
        }
        summary { cursor: pointer; font-weight: 600; }
        pre { white-space: pre-wrap; margin-top: 0.75rem; font-family: ui-monospace, monospace; }
        .scroll { overflow: auto; max-height: 24rem; }
        table { border-collapse: collapse; width: 100%; font-size: 0.85rem; }
        th, td { padding: 0.35rem 0.6rem; border-bottom: 1px solid rgba(255,255,255,0.08); text-align: left; }
        th { color: var(--muted); }
        .notice { margin-top: 1rem; padding: 0.75rem 1rem; border-radius: 6px; }
        .notice.info { background: rgba(14,165,233,0.15); border-left: 4px solid var(--info); }
        .notice.error { background: rgba(239,68,68,0.15); border-left: 4px solid var(--danger); }
        #result { margin-top: 1.5rem; }
    </style>
</head>
<body>
    <aside>
        <label for="database">Select a database:</label>
        <select id="database"></select>
    </aside>
    <main>
        <h1>&#128269; Query Your Data</h1>
        <div class="columns">
            <section>
                <h2>Database Tables</h2>
                <div id="samples"></div>
            </section>
            <section>
                <form id="question-form">
                    <label for="question">Enter text:</label>
                    <textarea id="question">Who won the most gold medals in 2012?</textarea>
                    <button type="submit" id="submit">Submit</button>
                </form>
                <details id="sql-panel" open hidden>
                    <summary>SQL Query</summary>
                    <pre id="sql"></pre>
                </details>
                <div id="result"></div>
            </section>
        </div>
    </main>
    <script>
        const databaseSelect = document.getElementById('database');
        const samplesEl = document.getElementById('samples');
        const form = document.getElementById('question-form');
        const submitBtn = document.getElementById('submit');
        const sqlPanel = document.getElementById('sql-panel');
        const sqlEl = document.getElementById('sql');
        const resultEl = document.getElementById('result');

        function escapeHtml(text) {
            const div = document.createElement('div');
            div.textContent = text === null ? 'NULL' : String(text);
            return div.innerHTML;
        }

        function renderTable(result) {
            const head = result.columns.map(c => `<th>${escapeHtml(c)}</th>`).join('');
            const body = result.rows
                .map(row => `<tr>${row.map(v => `<td>${escapeHtml(v)}</td>`).join('')}</tr>`)
                .join('');
            return `<div class="scroll"><table><thead><tr>${head}</tr></thead><tbody>${body}</tbody></table></div>`;
        }

        function notice(kind, message) {
            return `<div class="notice ${kind}">${escapeHtml(message)}</div>`;
        }

        async function loadDatabases() {
            const response = await fetch('/api/databases');
            const databases = await response.json();
            databaseSelect.innerHTML = databases
                .map(d => `<option value="${escapeHtml(d.name)}">${escapeHtml(d.name)}</option>`)
                .join('');
            if (databases.length === 0) {
                samplesEl.innerHTML = notice('info', 'No databases found.');
                submitBtn.disabled = true;
                return;
            }
            await loadSamples();
        }

        async function loadSamples() {
            const name = databaseSelect.value;
            samplesEl.innerHTML = '';
            if (!name) return;
            const response = await fetch(`/api/databases/${encodeURIComponent(name)}/samples`);
            if (!response.ok) {
                const body = await response.json();
                samplesEl.innerHTML = notice('error', body.error);
                return;
            }
            const samples = await response.json();
            samplesEl.innerHTML = samples
                .map(s => `<h4>Sample from ${escapeHtml(s.table)}</h4>${renderTable(s.sample)}`)
                .join('');
        }

        function handleEvent(name, data) {
            switch (name) {
                case 'token':
                    sqlEl.textContent += JSON.parse(data);
                    break;
                case 'statement':
                    sqlEl.textContent = JSON.parse(data);
                    break;
                case 'rows':
                    resultEl.innerHTML = renderTable(JSON.parse(data));
                    break;
                case 'empty':
                    resultEl.innerHTML = notice('info', JSON.parse(data));
                    break;
                case 'error':
                    resultEl.innerHTML = notice('error', JSON.parse(data));
                    break;
            }
        }

        async function submitQuestion(event) {
            event.preventDefault();
            const database = databaseSelect.value;
            if (!database) return;

            submitBtn.disabled = true;
            sqlPanel.hidden = false;
            sqlEl.textContent = '';
            resultEl.innerHTML = '';

            try {
                const response = await fetch('/api/query', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ database, question: document.getElementById('question').value }),
                });
                if (!response.ok) {
                    const body = await response.json();
                    resultEl.innerHTML = notice('error', body.error);
                    return;
                }

                const reader = response.body.getReader();
                const decoder = new TextDecoder();
                let buffer = '';
                for (;;) {
                    const { value, done } = await reader.read();
                    if (done) break;
                    buffer += decoder.decode(value, { stream: true });

                    let boundary;
                    while ((boundary = buffer.indexOf('\n\n')) >= 0) {
                        const block = buffer.slice(0, boundary);
                        buffer = buffer.slice(boundary + 2);

                        let name = 'message';
                        const data = [];
                        for (const line of block.split('\n')) {
                            if (line.startsWith('event:')) name = line.slice(6).trim();
                            else if (line.startsWith('data:')) data.push(line.slice(5).replace(/^ /, ''));
                        }
                        if (data.length > 0 && data.join('') !== '') handleEvent(name, data.join('\n'));
                    }
                }
            } catch (err) {
                resultEl.innerHTML = notice('error', err.message);
            } finally {
                submitBtn.disabled = false;
            }
        }

        databaseSelect.addEventListener('change', loadSamples);
        form.addEventListener('submit', submitQuestion);
        loadDatabases();
    </script>
</body>
</html>
"#;
