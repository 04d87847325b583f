// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

pub const DASHBOARD_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>OptiGenius</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 64rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
  h1 { font-size: 1.6rem; }
  select, input, button, textarea { font: inherit; padding: 0.4rem; margin: 0.2rem 0; }
  textarea { width: 100%; min-height: 6rem; }
  button { cursor: pointer; }
  pre { background: #f5f5f5; padding: 1rem; overflow-x: auto; white-space: pre-wrap; }
  .muted { color: #777; }
  .error { color: #b00020; }
  section { margin-top: 1.5rem; }
</style>
</head>
<body>
<h1>OptiGenius</h1>
<p class="muted">Pick a supply-chain scenario, preview its synthetic data, and run the
solver workflow; or paste your own problem statement.</p>

<section>
  <label for="scenario">Scenario</label>
  <select id="scenario"></select>
  <label for="seed">Seed</label>
  <input id="seed" type="number" value="42" min="0">
  <button id="preview">Preview data</button>
  <button id="run">Generate report</button>
</section>

<section>
  <label for="custom">Or enter a problem statement</label>
  <textarea id="custom" placeholder="Describe the optimisation problem..."></textarea>
  <button id="run-custom">Solve custom problem</button>
</section>

<section id="output">
  <pre id="result" class="muted">No run yet.</pre>
</section>

<script>
const resultBox = document.getElementById('result');

function show(text, isError) {
  resultBox.textContent = text;
  resultBox.className = isError ? 'error' : '';
}

async function loadScenarios() {
  const response = await fetch('/v1/scenarios');
  const body = await response.json();
  const select = document.getElementById('scenario');
  for (const scenario of body.scenarios) {
    const option = document.createElement('option');
    option.value = scenario.slug;
    option.textContent = scenario.title + ' - ' + scenario.description;
    select.appendChild(option);
  }
}

async function previewData() {
  const slug = document.getElementById('scenario').value;
  const seed = document.getElementById('seed').value;
  show('Generating data...', false);
  const response = await fetch('/v1/scenarios/' + slug + '/data?seed=' + seed);
  const body = await response.json();
  if (!response.ok) { show(body.message, true); return; }
  show(body.markdown, false);
}

async function runSession(payload) {
  show('OptiGenius is finding the solution...', false);
  const response = await fetch('/v1/sessions', {
    method: 'POST',
    headers: { 'content-type': 'application/json' },
    body: JSON.stringify(payload),
  });
  const body = await response.json();
  if (!response.ok) { show(body.message, true); return; }
  show(body.report, false);
}

document.getElementById('preview').addEventListener('click', previewData);
document.getElementById('run').addEventListener('click', () => runSession({
  scenario: document.getElementById('scenario').value,
  seed: Number(document.getElementById('seed').value),
}));
document.getElementById('run-custom').addEventListener('click', () => runSession({
  problem_statement: document.getElementById('custom').value,
}));

loadScenarios();
</script>
</body>
</html>
"#;
