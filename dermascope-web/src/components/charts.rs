use dermascope_core::charts::{bar_layout, line_path, line_points, VIEW_HEIGHT, VIEW_WIDTH};
use leptos::prelude::*;

fn view_box() -> String {
    format!("0 0 {} {}", VIEW_WIDTH, VIEW_HEIGHT)
}

/// Predictions per class
#[component]
pub fn BarChart(#[prop(into)] data: Signal<Vec<(String, usize)>>) -> impl IntoView {
    let bars = move || bar_layout(&data.get());

    view! {
        <svg class="chart bar-chart" viewBox=view_box() preserveAspectRatio="xMidYMid meet">
            <line class="axis" x1="10" y1="180" x2="290" y2="180"></line>
            {move || {
                bars()
                    .into_iter()
                    .map(|bar| {
                        let center = bar.center_x().to_string();
                        let value_y = (bar.y - 4.0).to_string();
                        view! {
                            <g>
                                <rect
                                    class="bar"
                                    x=bar.x.to_string()
                                    y=bar.y.to_string()
                                    width=bar.width.to_string()
                                    height=bar.height.to_string()
                                    rx="3"
                                ></rect>
                                <text class="bar-value" x=center.clone() y=value_y text-anchor="middle">
                                    {bar.value.to_string()}
                                </text>
                                <text class="bar-label" x=center y="195" text-anchor="middle">
                                    {bar.label}
                                </text>
                            </g>
                        }
                    })
                    .collect_view()
            }}
        </svg>
    }
}

/// Predictions per week, oldest bucket first
#[component]
pub fn LineChart(#[prop(into)] data: Signal<Vec<usize>>) -> impl IntoView {
    let points = move || line_points(&data.get());

    view! {
        <svg class="chart line-chart" viewBox=view_box() preserveAspectRatio="xMidYMid meet">
            <line class="axis" x1="20" y1="160" x2="280" y2="160"></line>
            <path class="line" fill="none" d=move || line_path(&points())></path>
            {move || {
                points()
                    .into_iter()
                    .enumerate()
                    .map(|(i, (x, y))| {
                        let (x, y) = (x.to_string(), y.to_string());
                        view! {
                            <circle class="point" cx=x.clone() cy=y r="3"></circle>
                            <text class="week-label" x=x y="180" text-anchor="middle">
                                {format!("W{}", i + 1)}
                            </text>
                        }
                    })
                    .collect_view()
            }}
        </svg>
    }
}
