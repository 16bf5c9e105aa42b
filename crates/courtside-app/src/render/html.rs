use super::PageOptions;
use anyhow::Result;
use courtside_core::dedup::base_stat_name;
use courtside_core::derive::{DerivedRow, StatTable};
use courtside_core::distribution::{DistributionSummary, StripLayout};
use courtside_core::filter::DISTRIBUTION_COLUMN;
use courtside_core::query::TEAMS_PARAM;
use courtside_core::record::Cell;
use courtside_core::stat::{TeamDirectory, NAME_FIELD, TYPE_FIELD};
use std::fmt::Write as FmtWrite;

const STYLE: &str = "\
body{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}
h1{margin:0 0 8px 0;font-size:24px;}
.filter{margin:0 0 16px 0;}
.filter input{width:240px;padding:4px;}
table.stats{border-collapse:collapse;font-size:12px;}
table.stats th{cursor:pointer;border-bottom:2px solid #444;padding:4px 6px;text-align:right;}
table.stats th[data-sort-method=none]{cursor:default;}
table.stats td{border-bottom:1px solid #eee;padding:2px 6px;text-align:right;font-weight:bold;}
table.stats td.name,table.stats td.type,table.stats th:nth-child(-n+2){text-align:left;}
table.stats td.name a{color:#225;text-decoration:none;}
tr.defense td.type{color:#06c;}
svg.vis .axis line,svg.vis .axis path{stroke:#999;shape-rendering:crispEdges;}
svg.vis .axis text{font-size:9px;fill:#666;}
svg.vis rect.team{fill:#bbb;fill-opacity:.7;}
svg.vis rect.team.AVG{fill:#c00;fill-opacity:1;}
td.distribution.missing{background:repeating-linear-gradient(45deg,#fff,#fff 4px,#f4f4f4 4px,#f4f4f4 8px);min-width:100px;}
.meta{color:#777;font-size:11px;margin-top:12px;}
";

const SORT_SCRIPT: &str = "\
document.querySelectorAll('table.stats').forEach(function (table) {
  var tbody = table.tBodies[0];
  var heads = table.querySelectorAll('th');
  heads.forEach(function (th, col) {
    var method = th.getAttribute('data-sort-method');
    if (method === 'none') return;
    th.addEventListener('click', function () {
      var dir = th.getAttribute('aria-sort') === 'ascending' ? -1 : 1;
      heads.forEach(function (h) { h.removeAttribute('aria-sort'); });
      th.setAttribute('aria-sort', dir === 1 ? 'ascending' : 'descending');
      var rows = Array.prototype.slice.call(tbody.rows);
      rows.sort(function (a, b) {
        var x = a.cells[col] ? a.cells[col].textContent : '';
        var y = b.cells[col] ? b.cells[col].textContent : '';
        if (method === 'number') {
          var nx = parseFloat(x), ny = parseFloat(y);
          if (isNaN(nx)) return 1;
          if (isNaN(ny)) return -1;
          return (nx - ny) * dir;
        }
        return x.localeCompare(y) * dir;
      });
      rows.forEach(function (r) { tbody.appendChild(r); });
    });
  });
});
";

// Re-applies the `teams` filter from the browser's query string. Team columns
// are the ones sorted as numbers.
const FILTER_SCRIPT: &str = "\
(function () {
  var param = new URLSearchParams(window.location.search).get('teams');
  if (!param) return;
  var wanted = {};
  param.split(',').forEach(function (t) {
    t = t.trim();
    if (t) wanted[t] = true;
  });
  var input = document.querySelector('.js-sel');
  if (input) input.value = param;
  document.querySelectorAll('table.stats').forEach(function (table) {
    var hidden = [];
    table.querySelectorAll('thead th').forEach(function (th, col) {
      if (th.getAttribute('data-sort-method') === 'number' && !wanted[th.textContent]) {
        hidden.push(col);
      }
    });
    Array.prototype.forEach.call(table.rows, function (row) {
      hidden.forEach(function (col) {
        if (row.cells[col]) row.cells[col].style.display = 'none';
      });
    });
  });
})();
";

/// Render the full page.
pub fn render_page(table: &StatTable, teams: &TeamDirectory, opts: &PageOptions) -> Result<String> {
    let mut html = String::with_capacity(64 * 1024);
    let title = html_escape(&opts.title);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(html, "<title>{title}</title>")?;
    writeln!(html, "<style>\n{STYLE}</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<h1>{title}</h1>")?;

    writeln!(html, "<form class=\"filter\" method=\"get\">")?;
    writeln!(
        html,
        "<input class=\"js-sel\" type=\"text\" name=\"{TEAMS_PARAM}\" value=\"{}\" placeholder=\"BOS,LAL\"/>",
        html_escape(&opts.teams_param)
    )?;
    writeln!(html, "<button class=\"js-filter\" type=\"submit\">Filter</button>")?;
    writeln!(html, "</form>")?;

    writeln!(html, "<div class=\"js-vis\">")?;
    writeln!(html, "<table id=\"stat-table\" class=\"stats\">")?;
    write_header(&mut html, &table.header, teams)?;
    writeln!(html, "<tbody>")?;
    for row in &table.rows {
        write_row(&mut html, row, opts)?;
    }
    writeln!(html, "</tbody>")?;
    writeln!(html, "</table>")?;
    writeln!(html, "</div>")?;

    writeln!(
        html,
        "<div class=\"meta\">{} stats, {} teams. Generated {}.</div>",
        table.rows.len(),
        teams.len(),
        opts.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(html, "<script>\n{SORT_SCRIPT}</script>")?;
    writeln!(html, "<script>\n{FILTER_SCRIPT}</script>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;
    Ok(html)
}

fn sort_method(column: &str) -> &'static str {
    match column {
        NAME_FIELD | TYPE_FIELD => "string",
        DISTRIBUTION_COLUMN => "none",
        _ => "number",
    }
}

fn write_header(html: &mut String, header: &[String], teams: &TeamDirectory) -> Result<()> {
    writeln!(html, "<thead>")?;
    write!(html, "<tr>")?;
    for column in header {
        let title = teams
            .get(column)
            .and_then(|t| t.name.as_deref())
            .map(|n| format!(" title=\"{}\"", html_escape(n)))
            .unwrap_or_default();
        write!(
            html,
            "<th data-sort-method=\"{}\"{title}>{}</th>",
            sort_method(column),
            html_escape(column)
        )?;
    }
    writeln!(html, "</tr>")?;
    writeln!(html, "</thead>")?;
    Ok(())
}

fn write_row(html: &mut String, derived: &DerivedRow, opts: &PageOptions) -> Result<()> {
    let row = &derived.row;
    write!(
        html,
        "<tr class=\"stat-row {}\">",
        html_escape(&row.category.to_lowercase())
    )?;

    let (href, label) = stat_link(&opts.stats_base_url, &row.name, &row.category);
    write!(
        html,
        "<td class=\"name\"><a href=\"{}\">{}</a></td>",
        html_escape(&href),
        html_escape(&label)
    )?;
    write!(html, "<td class=\"type\">{}</td>", html_escape(&row.category))?;

    for (abbr, cell) in row.teams.iter() {
        match cell {
            Cell::Numeric(v) => write!(
                html,
                "<td class=\"{}\" style=\"color:{}\">{}</td>",
                html_escape(abbr),
                opts.ramp.color(*v),
                cell
            )?,
            Cell::Text(s) => write!(html, "<td class=\"{}\">{}</td>", html_escape(abbr), html_escape(s))?,
        }
    }

    match &derived.strip {
        Ok(summary) => {
            write!(html, "<td class=\"distribution\">")?;
            write_strip(html, summary, &row.name, &opts.layout)?;
            write!(html, "</td>")?;
        }
        Err(_) => write!(html, "<td class=\"distribution missing\"></td>")?,
    }
    writeln!(html, "</tr>")?;
    Ok(())
}

/// Link target and text for a stat's name cell.
fn stat_link(base_url: &str, rank_name: &str, category: &str) -> (String, String) {
    let base = base_stat_name(rank_name);
    let href = format!(
        "{}/{}#!?sort={}&dir=-1",
        base_url.trim_end_matches('/'),
        category_slug(category),
        base
    );
    (href, base.replace('_', " "))
}

/// Stats site section for a category. Defensive stats live under the
/// opponent section.
fn category_slug(category: &str) -> String {
    if category == "Defense" {
        "opponent".to_string()
    } else {
        category.to_lowercase().replace(' ', "-")
    }
}

fn write_strip(
    html: &mut String,
    summary: &DistributionSummary,
    rank_name: &str,
    layout: &StripLayout,
) -> Result<()> {
    let inner_w = layout.inner_width();
    let inner_h = layout.inner_height();

    write!(
        html,
        "<svg class=\"vis {} {}\" width=\"{}\" height=\"{}\">",
        html_escape(&summary.stat),
        html_escape(rank_name),
        fmt_num(layout.width),
        fmt_num(layout.height)
    )?;
    write!(
        html,
        "<g transform=\"translate({},{})\">",
        fmt_num(layout.margin.left),
        fmt_num(layout.margin.top)
    )?;

    // Axis along the bottom of the plot area.
    write!(
        html,
        "<g class=\"axis\" transform=\"translate(0,{})\">",
        fmt_num(inner_h)
    )?;
    write!(
        html,
        "<path class=\"domain\" d=\"M0,6V0H{}V6\" fill=\"none\"/>",
        fmt_num(inner_w)
    )?;
    for (value, offset) in &summary.ticks {
        write!(
            html,
            "<g class=\"tick\" transform=\"translate({},0)\"><line y2=\"6\"/><text y=\"9\" dy=\"0.71em\" text-anchor=\"middle\">{}</text></g>",
            fmt_num(*offset),
            fmt_num(*value)
        )?;
    }
    write!(html, "</g>")?;

    write!(html, "<g class=\"distribution\">")?;
    for mark in &summary.marks {
        write!(
            html,
            "<rect class=\"team {}\" width=\"{}\" height=\"{}\" x=\"{}\"><title>{}: {}</title></rect>",
            html_escape(&mark.label),
            fmt_num(layout.mark_width),
            fmt_num(inner_h),
            fmt_num(mark.offset),
            html_escape(&mark.label),
            fmt_num(mark.value)
        )?;
    }
    write!(html, "</g></g></svg>")?;
    Ok(())
}

/// Format a number with at most two decimals and no trailing zeros.
fn fmt_num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::color::ColorRamp;
    use chrono::{TimeZone, Utc};
    use courtside_core::derive::derive;
    use courtside_core::filter::TeamFilter;
    use courtside_core::record::normalize_row;
    use courtside_core::stat::{DataSnapshot, StatRow, TeamRecord};
    use std::collections::HashMap;

    fn stat(name: &str, category: &str, values: &[(&str, &str)]) -> StatRow {
        let mut raw = vec![("name", name), ("type", category)];
        raw.extend_from_slice(values);
        StatRow::from_record(normalize_row(raw)).unwrap()
    }

    fn snapshot() -> DataSnapshot {
        let teams = vec![
            TeamRecord {
                abbr: "BOS".into(),
                name: Some("Boston Celtics".into()),
                extra: HashMap::new(),
            },
            TeamRecord {
                abbr: "LAL".into(),
                name: None,
                extra: HashMap::new(),
            },
        ];
        DataSnapshot {
            teams: TeamDirectory::new(teams).unwrap(),
            stats: vec![
                stat("OPP_PTS", "Defense", &[("BOS", "101"), ("LAL", "112")]),
                stat("OPP_PTS_RANK", "Defense", &[("BOS", "2"), ("LAL", "27")]),
                stat("FG3_PCT_RANK", "Three Point", &[("BOS", "4"), ("LAL", "n/a")]),
            ],
        }
    }

    fn options(teams_param: &str) -> PageOptions {
        PageOptions {
            title: "Stats <2024>".into(),
            stats_base_url: "http://stats.nba.com/teams".into(),
            teams_param: teams_param.into(),
            layout: StripLayout::default(),
            ramp: ColorRamp::default(),
            generated_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    fn render(filter: &str) -> String {
        let snap = snapshot();
        let table = derive(&snap, &TeamFilter::from_param(filter), &StripLayout::default());
        render_page(&table, &snap.teams, &options(filter)).unwrap()
    }

    // -- Helpers --

    #[test]
    fn fmt_num_trims_zeros() {
        assert_eq!(fmt_num(480.0), "480");
        assert_eq!(fmt_num(98.2), "98.2");
        assert_eq!(fmt_num(1.0 / 3.0), "0.33");
        assert_eq!(fmt_num(-0.001), "0");
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(html_escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn defense_links_to_opponent_section() {
        let (href, label) = stat_link("http://stats.nba.com/teams/", "OPP_PTS_RANK", "Defense");
        assert_eq!(href, "http://stats.nba.com/teams/opponent#!?sort=OPP_PTS&dir=-1");
        assert_eq!(label, "OPP PTS");
    }

    #[test]
    fn category_slug_lowercases_and_hyphenates() {
        assert_eq!(category_slug("Three Point"), "three-point");
        assert_eq!(category_slug("Offense"), "offense");
    }

    // -- Page --

    #[test]
    fn header_has_sort_methods_and_team_titles() {
        let page = render("");
        assert!(page.contains("<th data-sort-method=\"string\">name</th>"));
        assert!(page.contains("<th data-sort-method=\"string\">type</th>"));
        assert!(page.contains("<th data-sort-method=\"number\" title=\"Boston Celtics\">BOS</th>"));
        assert!(page.contains("<th data-sort-method=\"number\">LAL</th>"));
        assert!(page.contains("<th data-sort-method=\"none\">distribution</th>"));
    }

    #[test]
    fn rows_carry_category_class_and_colored_ranks() {
        let page = render("");
        assert!(page.contains("<tr class=\"stat-row defense\">"));
        assert!(page.contains("<tr class=\"stat-row three point\">"));
        let color = ColorRamp::default().color(2.0);
        assert!(page.contains(&format!("<td class=\"BOS\" style=\"color:{color}\">2</td>")));
        assert!(page.contains("<td class=\"LAL\">n/a</td>"));
    }

    #[test]
    fn strip_has_one_rect_per_team_plus_average() {
        let page = render("");
        assert_eq!(page.matches("<rect class=\"team BOS\"").count(), 1);
        assert_eq!(page.matches("<rect class=\"team AVG\"").count(), 1);
        assert_eq!(page.matches("<rect ").count(), 3);
        assert!(page.contains("<svg class=\"vis OPP_PTS OPP_PTS_RANK\" width=\"500\" height=\"40\">"));
        assert!(page.contains("<title>AVG: 106.5</title>"));
    }

    #[test]
    fn missing_base_stat_leaves_gap() {
        let page = render("");
        assert_eq!(page.matches("<td class=\"distribution missing\"></td>").count(), 1);
    }

    #[test]
    fn filtered_page_drops_other_columns() {
        let page = render("LAL");
        assert!(page.contains("value=\"LAL\""));
        assert!(!page.contains(">BOS</th>"));
        assert!(!page.contains("<td class=\"BOS\""));
        // The strip still shows the whole league.
        assert!(page.contains("<rect class=\"team BOS\""));
    }

    #[test]
    fn filter_form_is_applied_in_the_browser() {
        let page = render("");
        assert!(page.contains("<form class=\"filter\" method=\"get\">"));
        assert!(page.contains("name=\"teams\""));
        assert!(page.contains("new URLSearchParams(window.location.search).get('teams')"));
        // The script hides team columns by their sort method.
        assert_eq!(page.matches("<th data-sort-method=\"number\"").count(), 2);
        let filter_at = page.find("URLSearchParams").unwrap();
        assert!(filter_at > page.find("</table>").unwrap());
    }

    #[test]
    fn title_and_param_are_escaped() {
        let page = render("\"><script>");
        assert!(page.contains("<title>Stats &lt;2024&gt;</title>"));
        assert!(page.contains("value=\"&quot;&gt;&lt;script&gt;\""));
    }

    #[test]
    fn footer_reports_counts_and_time() {
        let page = render("");
        assert!(page.contains("2 stats, 2 teams. Generated 2024-01-02 03:04:05 UTC."));
    }
}
